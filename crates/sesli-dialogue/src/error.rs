//! Error types for the dialogue controller.

use sesli_core::error::SesliError;
use sesli_core::types::Phase;
use sesli_speech::SpeechError;

/// Everything that can end a dialogue turn.
///
/// All variants are terminal for the current turn: the controller returns to
/// `Idle` and waits for explicit re-activation. An answer outside the expected
/// vocabulary is not an error; it is re-prompted in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogueError {
    #[error("Speech recognition permission denied")]
    PermissionDenied,
    #[error("Capture device is busy")]
    DeviceBusy,
    #[error("No speech detected before the capture timeout")]
    NoSpeechDetected,
    #[error("Speech output unavailable: {0}")]
    OutputUnavailable(String),
    #[error("A capture session is already active")]
    AlreadyCapturing,
    #[error("An utterance is already playing")]
    AlreadySpeaking,
    #[error("A dialogue session is already running (phase {0})")]
    SessionActive(Phase),
    #[error("Invalid dialogue transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },
    #[error("Unexpected {input} in phase {phase}")]
    UnexpectedInput { phase: Phase, input: &'static str },
    #[error("Dialogue controller stopped")]
    Stopped,
}

impl DialogueError {
    /// Short machine-friendly name, used in surfaced-error events.
    pub fn kind(&self) -> &'static str {
        match self {
            DialogueError::PermissionDenied => "permission_denied",
            DialogueError::DeviceBusy => "device_busy",
            DialogueError::NoSpeechDetected => "no_speech_detected",
            DialogueError::OutputUnavailable(_) => "output_unavailable",
            DialogueError::AlreadyCapturing => "already_capturing",
            DialogueError::AlreadySpeaking => "already_speaking",
            DialogueError::SessionActive(_) => "session_active",
            DialogueError::InvalidTransition { .. } => "invalid_transition",
            DialogueError::UnexpectedInput { .. } => "unexpected_input",
            DialogueError::Stopped => "stopped",
        }
    }
}

impl From<SpeechError> for DialogueError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::OutputUnavailable(reason) => DialogueError::OutputUnavailable(reason),
            SpeechError::AlreadySpeaking => DialogueError::AlreadySpeaking,
            SpeechError::AlreadyCapturing => DialogueError::AlreadyCapturing,
        }
    }
}

impl From<DialogueError> for SesliError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::Stopped => SesliError::ShuttingDown,
            other => SesliError::Dialogue(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_conversion() {
        assert_eq!(
            DialogueError::from(SpeechError::AlreadyCapturing),
            DialogueError::AlreadyCapturing
        );
        assert_eq!(
            DialogueError::from(SpeechError::OutputUnavailable("no sink".to_string())),
            DialogueError::OutputUnavailable("no sink".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DialogueError::InvalidTransition {
                from: Phase::Idle,
                to: Phase::ReadingDetail
            }
            .to_string(),
            "Invalid dialogue transition: Idle -> ReadingDetail"
        );
        assert_eq!(
            DialogueError::SessionActive(Phase::AwaitingNext).to_string(),
            "A dialogue session is already running (phase AwaitingNext)"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(DialogueError::NoSpeechDetected.kind(), "no_speech_detected");
        assert_eq!(DialogueError::PermissionDenied.kind(), "permission_denied");
    }

    #[test]
    fn test_into_sesli_error() {
        let err: SesliError = DialogueError::DeviceBusy.into();
        assert!(matches!(err, SesliError::Dialogue(_)));
        let err: SesliError = DialogueError::Stopped.into();
        assert!(matches!(err, SesliError::ShuttingDown));
    }
}
