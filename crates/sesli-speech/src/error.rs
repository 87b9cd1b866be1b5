//! Error types for the speech boundaries.

use sesli_core::error::SesliError;

/// Failures of a speech operation that prevent it from running at all.
///
/// Recognition failures that end a capture session normally (timeout,
/// permission refusal, busy device, abort) are not errors: they are reported
/// as a [`CaptureOutcome`](crate::input::CaptureOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech output unavailable: {0}")]
    OutputUnavailable(String),
    #[error("An utterance is already playing")]
    AlreadySpeaking,
    #[error("A capture session is already active")]
    AlreadyCapturing,
}

impl From<SpeechError> for SesliError {
    fn from(err: SpeechError) -> Self {
        SesliError::Speech(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        assert_eq!(
            SpeechError::OutputUnavailable("no audio sink".to_string()).to_string(),
            "Speech output unavailable: no audio sink"
        );
        assert_eq!(
            SpeechError::AlreadySpeaking.to_string(),
            "An utterance is already playing"
        );
        assert_eq!(
            SpeechError::AlreadyCapturing.to_string(),
            "A capture session is already active"
        );
    }

    #[test]
    fn test_speech_error_into_sesli_error() {
        let err: SesliError = SpeechError::AlreadyCapturing.into();
        assert!(matches!(err, SesliError::Speech(_)));
        assert!(err.to_string().contains("already active"));
    }
}
