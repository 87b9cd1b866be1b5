use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Phase;

/// Everything a dialogue session reports to its surroundings.
///
/// Events are published by the dialogue controller after each state change and
/// consumed by:
/// - The console front-end (printed as the "display" of the session)
/// - Tests asserting on what was said and shown
/// - Any UI that wants a result list or an error banner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DialogueEvent {
    /// A new session was started by activation or a typed query.
    SessionStarted {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The controller moved between phases.
    PhaseChanged {
        from: Phase,
        to: Phase,
        timestamp: DateTime<Utc>,
    },

    /// An utterance finished playing.
    Spoke {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// A capture session recognized text.
    Heard {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// A query was run against the index.
    ResultsFound {
        query: String,
        result_ids: Vec<u32>,
        timestamp: DateTime<Utc>,
    },

    /// An answer did not match the expected vocabulary; the user is re-prompted.
    NotUnderstood {
        text: String,
        phase: Phase,
        timestamp: DateTime<Utc>,
    },

    /// A terminal error ended the turn. `message` is the user-facing text.
    ErrorSurfaced {
        kind: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The session returned to idle on its own.
    SessionEnded {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The dialogue state was cleared on request.
    Cleared { timestamp: DateTime<Utc> },
}

impl DialogueEvent {
    /// Short machine-friendly name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            DialogueEvent::SessionStarted { .. } => "session_started",
            DialogueEvent::PhaseChanged { .. } => "phase_changed",
            DialogueEvent::Spoke { .. } => "spoke",
            DialogueEvent::Heard { .. } => "heard",
            DialogueEvent::ResultsFound { .. } => "results_found",
            DialogueEvent::NotUnderstood { .. } => "not_understood",
            DialogueEvent::ErrorSurfaced { .. } => "error_surfaced",
            DialogueEvent::SessionEnded { .. } => "session_ended",
            DialogueEvent::Cleared { .. } => "cleared",
        }
    }
}
