//! Spoken prompt rendering.

use sesli_core::config::PromptConfig;
use sesli_core::types::SearchResult;

use crate::error::DialogueError;

/// Prompt texts with the announcement template filled in per result.
#[derive(Debug, Clone, Default)]
pub struct Prompts {
    texts: PromptConfig,
}

impl Prompts {
    pub fn new(texts: PromptConfig) -> Self {
        Self { texts }
    }

    pub fn greeting(&self) -> &str {
        &self.texts.greeting
    }

    pub fn no_results(&self) -> &str {
        &self.texts.no_results
    }

    pub fn no_more_results(&self) -> &str {
        &self.texts.no_more_results
    }

    pub fn not_understood(&self) -> &str {
        &self.texts.not_understood
    }

    pub fn next_or_clear(&self) -> &str {
        &self.texts.next_or_clear
    }

    /// Announce `result` at zero-based `position`.
    ///
    /// Placeholders: `{n}` 1-based position, `{title}`, `{score}` with two
    /// decimals.
    pub fn announcement(&self, position: usize, result: &SearchResult) -> String {
        self.texts
            .announcement
            .replace("{n}", &(position + 1).to_string())
            .replace("{score}", &format!("{:.2}", result.relevance_score()))
            .replace("{title}", result.title())
    }

    /// Full reading of `result`.
    pub fn detail(&self, result: &SearchResult) -> String {
        format!("{}. {}", result.title(), result.content())
    }

    /// User-facing message for an error that ends the turn.
    pub fn error_message(&self, err: &DialogueError) -> &str {
        match err {
            DialogueError::NoSpeechDetected => &self.texts.no_speech,
            DialogueError::PermissionDenied => &self.texts.recognition_error,
            DialogueError::DeviceBusy | DialogueError::AlreadyCapturing => &self.texts.device_busy,
            DialogueError::OutputUnavailable(_) | DialogueError::AlreadySpeaking => {
                &self.texts.output_unavailable
            }
            // Internal faults share the generic recognition-error wording.
            DialogueError::SessionActive(_)
            | DialogueError::InvalidTransition { .. }
            | DialogueError::UnexpectedInput { .. }
            | DialogueError::Stopped => &self.texts.recognition_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_announcement() {
        let prompts = Prompts::default();
        let result = SearchResult::new(1, "React Hooks Kullanımı", "useState", 0.95);
        assert_eq!(
            prompts.announcement(0, &result),
            "1. sonuç: React Hooks Kullanımı. Alaka düzeyi: 0.95. Daha fazla bilgi ister misiniz?"
        );
    }

    #[test]
    fn test_announcement_position_and_rounding() {
        let prompts = Prompts::default();
        let result = SearchResult::new(6, "React Native", "Mobil", 0.7);
        let text = prompts.announcement(2, &result);
        assert!(text.starts_with("3. sonuç: React Native."));
        assert!(text.contains("0.70"));
    }

    #[test]
    fn test_title_with_placeholder_text_is_not_expanded() {
        let prompts = Prompts::default();
        let result = SearchResult::new(9, "Şablon {n}", "x", 0.5);
        assert!(prompts.announcement(0, &result).contains("Şablon {n}"));
    }

    #[test]
    fn test_detail() {
        let prompts = Prompts::default();
        let result = SearchResult::new(3, "Docker", "Konteyner teknolojisi.", 0.8);
        assert_eq!(prompts.detail(&result), "Docker. Konteyner teknolojisi.");
    }

    #[test]
    fn test_error_messages() {
        let prompts = Prompts::default();
        assert_eq!(
            prompts.error_message(&DialogueError::NoSpeechDetected),
            "Ses algılanamadı. Lütfen tekrar deneyin."
        );
        assert_eq!(
            prompts.error_message(&DialogueError::DeviceBusy),
            "Mikrofon şu anda kullanımda."
        );
        assert_eq!(
            prompts.error_message(&DialogueError::OutputUnavailable("x".to_string())),
            "Ses çıkışı kullanılamıyor."
        );
    }

    #[test]
    fn test_permission_and_internal_errors_use_recognition_error_text() {
        let prompts = Prompts::new(PromptConfig {
            recognition_error: "Tanıma başarısız.".to_string(),
            ..PromptConfig::default()
        });
        assert_eq!(
            prompts.error_message(&DialogueError::PermissionDenied),
            "Tanıma başarısız."
        );
        assert_eq!(
            prompts.error_message(&DialogueError::SessionActive(sesli_core::types::Phase::Idle)),
            "Tanıma başarısız."
        );
    }

    #[test]
    fn test_custom_template() {
        let prompts = Prompts::new(PromptConfig {
            announcement: "#{n} {title} ({score})".to_string(),
            ..PromptConfig::default()
        });
        let result = SearchResult::new(1, "Go", "g", 0.456);
        assert_eq!(prompts.announcement(0, &result), "#1 Go (0.46)");
    }
}
