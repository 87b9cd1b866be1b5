//! Speech-to-text boundary.
//!
//! A capture session listens for one utterance and ends with exactly one
//! [`CaptureOutcome`]. Only one session may be open at a time; the timeout is
//! measured from session start and `abort` always ends the session with
//! [`CaptureOutcome::Aborted`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};

use crate::error::SpeechError;
use crate::gate::ExclusiveGate;

/// How a capture session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The engine recognized an utterance.
    Recognized(String),
    /// The timeout elapsed without a result.
    NoSpeechDetected,
    /// Microphone or recognition permission was refused.
    Denied,
    /// The capture device is held by something else.
    DeviceBusy,
    /// The caller aborted the session.
    Aborted,
}

impl fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureOutcome::Recognized(text) => write!(f, "Recognized({:?})", text),
            CaptureOutcome::NoSpeechDetected => write!(f, "NoSpeechDetected"),
            CaptureOutcome::Denied => write!(f, "Denied"),
            CaptureOutcome::DeviceBusy => write!(f, "DeviceBusy"),
            CaptureOutcome::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Service for capturing one utterance as text.
pub trait SpeechInput: Send + Sync {
    /// Listen for a single utterance in `language`.
    ///
    /// # Errors
    /// `AlreadyCapturing` if a session is already open; the open session is
    /// left untouched.
    fn capture(
        &self,
        language: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<CaptureOutcome, SpeechError>> + Send;

    /// Abort the open session, if any, releasing the device. Input heard but
    /// not yet delivered to a session is dropped.
    fn abort(&self);

    /// Drop input heard but not yet delivered, leaving any open session
    /// running.
    fn discard_pending(&self);

    /// Whether a capture session is open.
    fn is_capturing(&self) -> bool;
}

impl<T: SpeechInput> SpeechInput for Arc<T> {
    fn capture(
        &self,
        language: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<CaptureOutcome, SpeechError>> + Send {
        (**self).capture(language, timeout)
    }

    fn abort(&self) {
        (**self).abort()
    }

    fn discard_pending(&self) {
        (**self).discard_pending()
    }

    fn is_capturing(&self) -> bool {
        (**self).is_capturing()
    }
}

// =============================================================================
// Channel-fed recognizer
// =============================================================================

/// Raw signal produced by a recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// A final transcript.
    Transcript(String),
    /// The engine was refused permission.
    PermissionDenied,
    /// The engine could not open the device.
    DeviceBusy,
}

impl From<RecognizerEvent> for CaptureOutcome {
    fn from(event: RecognizerEvent) -> Self {
        match event {
            RecognizerEvent::Transcript(text) if text.trim().is_empty() => {
                CaptureOutcome::NoSpeechDetected
            }
            RecognizerEvent::Transcript(text) => CaptureOutcome::Recognized(text),
            RecognizerEvent::PermissionDenied => CaptureOutcome::Denied,
            RecognizerEvent::DeviceBusy => CaptureOutcome::DeviceBusy,
        }
    }
}

/// Sending half that pushes recognizer events into a [`ChannelRecognizer`].
#[derive(Debug, Clone)]
pub struct RecognizerFeed {
    tx: mpsc::UnboundedSender<RecognizerEvent>,
}

impl RecognizerFeed {
    /// Push an event. Returns `false` if the recognizer is gone.
    pub fn send(&self, event: RecognizerEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Shorthand for a final transcript.
    pub fn say(&self, text: impl Into<String>) -> bool {
        self.send(RecognizerEvent::Transcript(text.into()))
    }
}

/// Recognizer whose results arrive over a channel.
///
/// The terminal front-end feeds typed lines through it; tests feed scripted
/// events. Events sent while no session is open wait for the next session
/// unless `abort` or `discard_pending` drops them first. A closed feed behaves
/// like a silent microphone: sessions end on timeout.
#[derive(Debug)]
pub struct ChannelRecognizer {
    events: Mutex<mpsc::UnboundedReceiver<RecognizerEvent>>,
    gate: ExclusiveGate,
}

impl ChannelRecognizer {
    /// Create a recognizer and the feed that drives it.
    pub fn new() -> (Self, RecognizerFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                events: Mutex::new(rx),
                gate: ExclusiveGate::new(),
            },
            RecognizerFeed { tx },
        )
    }
}

/// Empty the queue without waiting. Returns how many events were dropped.
fn drain(rx: &mut mpsc::UnboundedReceiver<RecognizerEvent>) -> usize {
    let mut dropped = 0;
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<RecognizerEvent>) -> RecognizerEvent {
    match rx.recv().await {
        Some(event) => event,
        None => std::future::pending().await,
    }
}

impl SpeechInput for ChannelRecognizer {
    async fn capture(
        &self,
        language: &str,
        timeout: Duration,
    ) -> Result<CaptureOutcome, SpeechError> {
        let session = self.gate.try_begin().ok_or(SpeechError::AlreadyCapturing)?;
        let started = Instant::now();
        tracing::debug!(
            language = %language,
            timeout_ms = timeout.as_millis() as u64,
            "Capture session started"
        );

        let mut events = self.events.lock().await;
        let outcome = tokio::select! {
            biased;
            () = session.token().cancelled() => CaptureOutcome::Aborted,
            () = tokio::time::sleep(timeout) => CaptureOutcome::NoSpeechDetected,
            event = next_event(&mut events) => CaptureOutcome::from(event),
        };
        if outcome == CaptureOutcome::Aborted {
            drain(&mut events);
        }
        drop(events);
        drop(session);

        tracing::debug!(
            outcome = %outcome,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Capture session ended"
        );
        Ok(outcome)
    }

    fn abort(&self) {
        if self.gate.cancel() {
            tracing::debug!("Capture session aborted");
        }
        self.discard_pending();
    }

    fn discard_pending(&self) {
        // A session holding the queue drains it itself when aborted.
        let Ok(mut events) = self.events.try_lock() else {
            return;
        };
        let dropped = drain(&mut events);
        if dropped > 0 {
            tracing::debug!(dropped, "Pending recognizer input discarded");
        }
    }

    fn is_capturing(&self) -> bool {
        self.gate.is_active()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_capture_recognized() {
        let (rec, feed) = ChannelRecognizer::new();
        feed.say("react");
        let outcome = rec.capture("tr-TR", TIMEOUT).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::Recognized("react".to_string()));
        assert!(!rec.is_capturing());
    }

    #[tokio::test]
    async fn test_capture_maps_engine_failures() {
        let (rec, feed) = ChannelRecognizer::new();
        feed.send(RecognizerEvent::PermissionDenied);
        feed.send(RecognizerEvent::DeviceBusy);
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::Denied
        );
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::DeviceBusy
        );
    }

    #[tokio::test]
    async fn test_blank_transcript_is_no_speech() {
        let (rec, feed) = ChannelRecognizer::new();
        feed.say("   ");
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::NoSpeechDetected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_times_out() {
        let (rec, _feed) = ChannelRecognizer::new();
        let started = tokio::time::Instant::now();
        let outcome = rec.capture("tr-TR", TIMEOUT).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::NoSpeechDetected);
        assert!(started.elapsed() >= TIMEOUT);
        assert!(!rec.is_capturing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_feed_times_out() {
        let (rec, feed) = ChannelRecognizer::new();
        drop(feed);
        let outcome = rec.capture("tr-TR", TIMEOUT).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::NoSpeechDetected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_capture_rejected() {
        let (rec, feed) = ChannelRecognizer::new();
        let (first, second) = tokio::join!(rec.capture("tr-TR", TIMEOUT), async {
            tokio::task::yield_now().await;
            let second = rec.capture("tr-TR", TIMEOUT).await;
            feed.say("evet");
            second
        });
        assert_eq!(second, Err(SpeechError::AlreadyCapturing));
        assert_eq!(first, Ok(CaptureOutcome::Recognized("evet".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_yields_aborted_and_releases() {
        let (rec, feed) = ChannelRecognizer::new();
        let (outcome, _) = tokio::join!(rec.capture("tr-TR", TIMEOUT), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            assert!(rec.is_capturing());
            rec.abort();
        });
        assert_eq!(outcome, Ok(CaptureOutcome::Aborted));
        assert!(!rec.is_capturing());

        // The device is free again.
        feed.say("tekrar");
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::Recognized("tekrar".to_string())
        );
    }

    #[tokio::test]
    async fn test_abort_without_session_keeps_later_input() {
        let (rec, feed) = ChannelRecognizer::new();
        rec.abort();
        assert!(!rec.is_capturing());
        feed.say("evet");
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::Recognized("evet".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_drops_queued_input() {
        let (rec, feed) = ChannelRecognizer::new();
        feed.say("react");
        feed.send(RecognizerEvent::PermissionDenied);
        rec.abort();

        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::NoSpeechDetected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_session_drops_input_queued_behind_it() {
        let (rec, feed) = ChannelRecognizer::new();
        let (outcome, _) = tokio::join!(rec.capture("tr-TR", TIMEOUT), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            rec.abort();
            feed.say("geç kalan");
        });
        assert_eq!(outcome, Ok(CaptureOutcome::Aborted));
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::NoSpeechDetected
        );
    }

    #[tokio::test]
    async fn test_discard_pending_keeps_open_session() {
        let (rec, feed) = ChannelRecognizer::new();
        feed.say("eski");
        rec.discard_pending();
        feed.say("yeni");
        assert_eq!(
            rec.capture("tr-TR", TIMEOUT).await.unwrap(),
            CaptureOutcome::Recognized("yeni".to_string())
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            CaptureOutcome::Recognized("evet".to_string()).to_string(),
            "Recognized(\"evet\")"
        );
        assert_eq!(CaptureOutcome::Aborted.to_string(), "Aborted");
    }
}
