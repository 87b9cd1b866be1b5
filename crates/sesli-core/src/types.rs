use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Search results
// =============================================================================

/// A single searchable record.
///
/// Records are immutable once constructed: the catalog owns them and the
/// dialogue only ever reads them. The JSON shape follows the web client,
/// so `relevanceScore` is accepted alongside `relevance_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    id: u32,
    title: String,
    content: String,
    #[serde(rename = "relevanceScore", alias = "relevance_score")]
    relevance_score: f64,
}

impl SearchResult {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        content: impl Into<String>,
        relevance_score: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            relevance_score,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Relevance in `[0, 1]`; higher ranks first.
    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }
}

// =============================================================================
// Dialogue phase
// =============================================================================

/// The discrete stage of a voice dialogue session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session. Waiting for activation.
    #[default]
    Idle,
    /// Greeting the user and listening for a search query.
    Capturing,
    /// Speaking the title of the result under the cursor.
    Announcing,
    /// Listening for a yes/no answer about the announced result.
    AwaitingConfirmation,
    /// Speaking the full content of the result under the cursor.
    ReadingDetail,
    /// Listening for "next" or "clear" after a detail reading.
    AwaitingNext,
}

impl Phase {
    /// Whether the phase requires a non-empty result list and a valid cursor.
    pub fn holds_cursor(&self) -> bool {
        matches!(self, Phase::AwaitingConfirmation | Phase::ReadingDetail)
    }

    /// Returns whether a transition from `self` to `target` is valid.
    ///
    /// Every active phase may fall back to `Idle`. Re-prompts stay in place
    /// and are not transitions.
    pub fn can_transition_to(&self, target: &Phase) -> bool {
        matches!(
            (self, target),
            (Phase::Idle, Phase::Capturing)
                | (Phase::Idle, Phase::Announcing)
                | (Phase::Capturing, Phase::Announcing)
                | (Phase::Announcing, Phase::AwaitingConfirmation)
                | (Phase::AwaitingConfirmation, Phase::ReadingDetail)
                | (Phase::AwaitingConfirmation, Phase::Announcing)
                | (Phase::ReadingDetail, Phase::AwaitingNext)
                | (Phase::AwaitingNext, Phase::Announcing)
                // Session end
                | (Phase::Capturing, Phase::Idle)
                | (Phase::Announcing, Phase::Idle)
                | (Phase::AwaitingConfirmation, Phase::Idle)
                | (Phase::ReadingDetail, Phase::Idle)
                | (Phase::AwaitingNext, Phase::Idle)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Capturing => write!(f, "Capturing"),
            Phase::Announcing => write!(f, "Announcing"),
            Phase::AwaitingConfirmation => write!(f, "AwaitingConfirmation"),
            Phase::ReadingDetail => write!(f, "ReadingDetail"),
            Phase::AwaitingNext => write!(f, "AwaitingNext"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_accessors() {
        let r = SearchResult::new(7, "Jest ile Unit Testing", "Jest bir test aracıdır.", 0.63);
        assert_eq!(r.id(), 7);
        assert_eq!(r.title(), "Jest ile Unit Testing");
        assert_eq!(r.content(), "Jest bir test aracıdır.");
        assert!((r.relevance_score() - 0.63).abs() < f64::EPSILON);
    }

    #[test]
    fn test_search_result_camel_case_json_shape() {
        let json = r#"{"id": 1, "title": "React Hooks", "content": "useState", "relevanceScore": 0.95}"#;
        let r: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.id(), 1);
        assert!((r.relevance_score() - 0.95).abs() < f64::EPSILON);

        let out = serde_json::to_string(&r).unwrap();
        assert!(out.contains("\"relevanceScore\""));
    }

    #[test]
    fn test_search_result_snake_case_alias() {
        let json = r#"{"id": 2, "title": "t", "content": "c", "relevance_score": 0.5}"#;
        let r: SearchResult = serde_json::from_str(json).unwrap();
        assert!((r.relevance_score() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phase_default_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Idle.to_string(), "Idle");
        assert_eq!(Phase::AwaitingConfirmation.to_string(), "AwaitingConfirmation");
        assert_eq!(Phase::AwaitingNext.to_string(), "AwaitingNext");
    }

    #[test]
    fn test_phase_holds_cursor() {
        assert!(Phase::AwaitingConfirmation.holds_cursor());
        assert!(Phase::ReadingDetail.holds_cursor());
        assert!(!Phase::Idle.holds_cursor());
        assert!(!Phase::Capturing.holds_cursor());
        assert!(!Phase::Announcing.holds_cursor());
        assert!(!Phase::AwaitingNext.holds_cursor());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Phase::Idle.can_transition_to(&Phase::Capturing));
        assert!(Phase::Idle.can_transition_to(&Phase::Announcing));
        assert!(Phase::Capturing.can_transition_to(&Phase::Announcing));
        assert!(Phase::Announcing.can_transition_to(&Phase::AwaitingConfirmation));
        assert!(Phase::AwaitingConfirmation.can_transition_to(&Phase::ReadingDetail));
        assert!(Phase::AwaitingConfirmation.can_transition_to(&Phase::Announcing));
        assert!(Phase::ReadingDetail.can_transition_to(&Phase::AwaitingNext));
        assert!(Phase::AwaitingNext.can_transition_to(&Phase::Announcing));
        assert!(Phase::AwaitingNext.can_transition_to(&Phase::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        // Cannot skip the announcement
        assert!(!Phase::Capturing.can_transition_to(&Phase::AwaitingConfirmation));
        assert!(!Phase::Idle.can_transition_to(&Phase::ReadingDetail));
        assert!(!Phase::AwaitingNext.can_transition_to(&Phase::ReadingDetail));

        // No self transitions
        assert!(!Phase::Idle.can_transition_to(&Phase::Idle));
        assert!(!Phase::AwaitingConfirmation.can_transition_to(&Phase::AwaitingConfirmation));
    }

    #[test]
    fn test_phase_serde_snake_case() {
        let s = serde_json::to_string(&Phase::AwaitingConfirmation).unwrap();
        assert_eq!(s, "\"awaiting_confirmation\"");
    }
}
