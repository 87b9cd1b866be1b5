//! Terminal session: typed lines stand in for the microphone, dialogue events
//! are rendered as the on-screen display.

use sesli_core::events::DialogueEvent;
use sesli_search::SearchIndex;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `:start` - begin a spoken session with the greeting.
    Start,
    /// `:ara <query>` - typed search.
    Search(String),
    /// `:temizle` - clear the search.
    Clear,
    /// `:durum` - print the dialogue state.
    State,
    /// `:yardim` - print the command list.
    Help,
    /// `:q` - quit.
    Quit,
    /// Anything else: what the user "said".
    Speech(String),
    Empty,
    /// A `:` command that does not exist.
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleCommand::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return ConsoleCommand::Speech(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "start" | "basla" | "başla" => ConsoleCommand::Start,
            "ara" | "search" if !arg.is_empty() => ConsoleCommand::Search(arg.to_string()),
            "temizle" | "clear" => ConsoleCommand::Clear,
            "durum" | "state" => ConsoleCommand::State,
            "yardim" | "yardım" | "help" | "h" => ConsoleCommand::Help,
            "q" | "quit" | "cikis" | "çıkış" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Komutlar:
  :start          sesli oturumu başlat (karşılama + dinleme)
  :ara <sorgu>    yazarak ara
  :temizle        aramayı temizle
  :durum          diyalog durumunu göster
  :q              çık
Diğer satırlar mikrofona söylenmiş gibi işlenir.";

/// Render an event for the terminal. Events that have no visible form
/// (utterances are printed by the synthesizer itself) yield `None`.
pub fn describe(event: &DialogueEvent, index: &SearchIndex) -> Option<String> {
    match event {
        DialogueEvent::Heard { text, .. } => Some(format!("🎤 {}", text)),
        DialogueEvent::ResultsFound {
            query, result_ids, ..
        } => {
            let mut out = format!("🔎 \"{}\": {} sonuç", query, result_ids.len());
            for id in result_ids {
                if let Some(result) = index.get(*id) {
                    out.push_str(&format!(
                        "\n   • {} ({:.2})",
                        result.title(),
                        result.relevance_score()
                    ));
                }
            }
            Some(out)
        }
        DialogueEvent::ErrorSurfaced { message, .. } => Some(format!("⚠️  {}", message)),
        DialogueEvent::Cleared { .. } => Some("🧹 Arama temizlendi.".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sesli_core::types::{Phase, SearchResult};

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse(":start"), ConsoleCommand::Start);
        assert_eq!(
            ConsoleCommand::parse(":ara  react hooks "),
            ConsoleCommand::Search("react hooks".to_string())
        );
        assert_eq!(ConsoleCommand::parse(":temizle"), ConsoleCommand::Clear);
        assert_eq!(ConsoleCommand::parse(":durum"), ConsoleCommand::State);
        assert_eq!(ConsoleCommand::parse(":q"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("   "), ConsoleCommand::Empty);
    }

    #[test]
    fn test_parse_speech_and_unknown() {
        assert_eq!(
            ConsoleCommand::parse("  evet "),
            ConsoleCommand::Speech("evet".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse(":ara"),
            ConsoleCommand::Unknown(":ara".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse(":foo bar"),
            ConsoleCommand::Unknown(":foo bar".to_string())
        );
    }

    #[test]
    fn test_describe_results_lists_titles() {
        let index = SearchIndex::new(vec![
            SearchResult::new(1, "React Hooks", "useState", 0.95),
            SearchResult::new(6, "React Native", "Mobil", 0.72),
        ])
        .unwrap();
        let event = DialogueEvent::ResultsFound {
            query: "react".to_string(),
            result_ids: vec![1, 6],
            timestamp: Utc::now(),
        };
        let text = describe(&event, &index).unwrap();
        assert!(text.starts_with("🔎 \"react\": 2 sonuç"));
        assert!(text.contains("React Hooks (0.95)"));
        assert!(text.contains("React Native (0.72)"));
    }

    #[test]
    fn test_describe_hides_internal_events() {
        let index = SearchIndex::new(Vec::new()).unwrap();
        let event = DialogueEvent::PhaseChanged {
            from: Phase::Idle,
            to: Phase::Capturing,
            timestamp: Utc::now(),
        };
        assert!(describe(&event, &index).is_none());

        let event = DialogueEvent::ErrorSurfaced {
            kind: "device_busy".to_string(),
            message: "Mikrofon şu anda kullanımda.".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(
            describe(&event, &index).as_deref(),
            Some("⚠️  Mikrofon şu anda kullanımda.")
        );
    }
}
