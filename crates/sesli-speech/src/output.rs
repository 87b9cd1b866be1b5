//! Text-to-speech boundary.
//!
//! Exactly one utterance may be in flight per engine. A `speak` issued while
//! another is playing is rejected with [`SpeechError::AlreadySpeaking`]; it is
//! never queued.

use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::error::SpeechError;
use crate::gate::ExclusiveGate;

/// How an utterance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Played to the end.
    Completed,
    /// Stopped by [`SpeechOutput::cancel`].
    Cancelled,
}

/// Service for speaking text aloud.
pub trait SpeechOutput: Send + Sync {
    /// Speak `text` in `language` and resolve once playback ends.
    ///
    /// # Errors
    /// * `AlreadySpeaking` if another utterance is in flight.
    /// * `OutputUnavailable` if the audio sink cannot be used; nothing is played.
    fn speak(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<Playback, SpeechError>> + Send;

    /// Stop the utterance in flight, if any. Its `speak` resolves to
    /// [`Playback::Cancelled`].
    fn cancel(&self);

    /// Whether an utterance is currently in flight.
    fn is_speaking(&self) -> bool;
}

impl<T: SpeechOutput> SpeechOutput for Arc<T> {
    fn speak(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<Playback, SpeechError>> + Send {
        (**self).speak(text, language)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }
}

// =============================================================================
// Console synthesizer
// =============================================================================

/// Prints utterances to a writer and holds them for a reading-speed duration.
///
/// Stands in for a real TTS engine in the terminal front-end: the user reads
/// the line while the dialogue waits as long as speaking it would take.
pub struct ConsoleSynthesizer {
    writer: Mutex<Box<dyn Write + Send>>,
    words_per_minute: u32,
    gate: ExclusiveGate,
}

impl std::fmt::Debug for ConsoleSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSynthesizer")
            .field("words_per_minute", &self.words_per_minute)
            .field("gate", &self.gate)
            .finish()
    }
}

impl ConsoleSynthesizer {
    /// Synthesizer printing to standard output.
    pub fn stdout(words_per_minute: u32) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), words_per_minute)
    }

    pub fn with_writer(writer: Box<dyn Write + Send>, words_per_minute: u32) -> Self {
        Self {
            writer: Mutex::new(writer),
            words_per_minute,
            gate: ExclusiveGate::new(),
        }
    }

    /// Time it takes to say `text` at the configured pace. Zero pace means instant.
    pub fn playback_duration(&self, text: &str) -> Duration {
        if self.words_per_minute == 0 {
            return Duration::ZERO;
        }
        let words = text.split_whitespace().count() as u64;
        Duration::from_millis(words * 60_000 / u64::from(self.words_per_minute))
    }
}

impl SpeechOutput for ConsoleSynthesizer {
    async fn speak(&self, text: &str, language: &str) -> Result<Playback, SpeechError> {
        let session = self.gate.try_begin().ok_or(SpeechError::AlreadySpeaking)?;

        {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(writer, "🔊 [{}] {}", language, text)
                .and_then(|_| writer.flush())
                .map_err(|e| SpeechError::OutputUnavailable(e.to_string()))?;
        }

        let duration = self.playback_duration(text);
        tracing::trace!(duration_ms = duration.as_millis() as u64, "Console utterance playing");

        tokio::select! {
            () = session.token().cancelled() => Ok(Playback::Cancelled),
            () = tokio::time::sleep(duration) => Ok(Playback::Completed),
        }
    }

    fn cancel(&self) {
        self.gate.cancel();
    }

    fn is_speaking(&self) -> bool {
        self.gate.is_active()
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock speech output that records what it was asked to say.
///
/// Clones share state, so a test can keep one handle for inspection while the
/// dialogue owns another. Playback takes `playback_delay` (zero by default)
/// and the output can be switched to "unavailable" to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechOutput {
    inner: Arc<MockOutputInner>,
}

#[derive(Debug, Default)]
struct MockOutputInner {
    spoken: Mutex<Vec<String>>,
    unavailable: AtomicBool,
    playback_delay_ms: AtomicU64,
    gate: ExclusiveGate,
}

impl MockSpeechOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose utterances each take `delay` to play.
    pub fn with_playback_delay(delay: Duration) -> Self {
        let mock = Self::new();
        mock.inner
            .playback_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
        mock
    }

    /// Make subsequent `speak` calls fail with `OutputUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Every text whose playback started, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.inner
            .spoken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_spoken(&self) -> Option<String> {
        self.spoken().pop()
    }
}

impl SpeechOutput for MockSpeechOutput {
    async fn speak(&self, text: &str, _language: &str) -> Result<Playback, SpeechError> {
        let session = self
            .inner
            .gate
            .try_begin()
            .ok_or(SpeechError::AlreadySpeaking)?;

        if self.inner.unavailable.load(Ordering::Relaxed) {
            return Err(SpeechError::OutputUnavailable(
                "mock output disabled".to_string(),
            ));
        }

        self.inner
            .spoken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());

        let delay = Duration::from_millis(self.inner.playback_delay_ms.load(Ordering::Relaxed));
        tokio::select! {
            () = session.token().cancelled() => Ok(Playback::Cancelled),
            () = tokio::time::sleep(delay) => Ok(Playback::Completed),
        }
    }

    fn cancel(&self) {
        self.inner.gate.cancel();
    }

    fn is_speaking(&self) -> bool {
        self.inner.gate.is_active()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that appends into a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Writer whose sink is gone.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_records_utterances() {
        let out = MockSpeechOutput::new();
        assert_eq!(out.speak("Merhaba", "tr-TR").await, Ok(Playback::Completed));
        assert_eq!(out.speak("Sonuç bulunamadı.", "tr-TR").await, Ok(Playback::Completed));
        assert_eq!(out.spoken(), vec!["Merhaba", "Sonuç bulunamadı."]);
        assert_eq!(out.last_spoken().as_deref(), Some("Sonuç bulunamadı."));
        assert!(!out.is_speaking());
    }

    #[tokio::test]
    async fn test_mock_clone_shares_state() {
        let out = MockSpeechOutput::new();
        let observer = out.clone();
        out.speak("evet", "tr-TR").await.unwrap();
        assert_eq!(observer.spoken(), vec!["evet"]);
    }

    #[tokio::test]
    async fn test_mock_unavailable() {
        let out = MockSpeechOutput::new();
        out.set_unavailable(true);
        let result = out.speak("Merhaba", "tr-TR").await;
        assert!(matches!(result, Err(SpeechError::OutputUnavailable(_))));
        assert!(out.spoken().is_empty());
        assert!(!out.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_speak_is_rejected() {
        let out = MockSpeechOutput::with_playback_delay(Duration::from_secs(2));
        let (first, second) = tokio::join!(out.speak("bir", "tr-TR"), async {
            tokio::task::yield_now().await;
            out.speak("iki", "tr-TR").await
        });
        assert_eq!(first, Ok(Playback::Completed));
        assert_eq!(second, Err(SpeechError::AlreadySpeaking));
        assert_eq!(out.spoken(), vec!["bir"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_playback() {
        let out = MockSpeechOutput::with_playback_delay(Duration::from_secs(30));
        let (result, _) = tokio::join!(out.speak("uzun bir cümle", "tr-TR"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(out.is_speaking());
            out.cancel();
        });
        assert_eq!(result, Ok(Playback::Cancelled));
        assert!(!out.is_speaking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_synthesizer_writes_line() {
        let buf = SharedBuf::default();
        let synth = ConsoleSynthesizer::with_writer(Box::new(buf.clone()), 120);
        let result = synth.speak("Başka sonuç kalmadı.", "tr-TR").await;
        assert_eq!(result, Ok(Playback::Completed));

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "🔊 [tr-TR] Başka sonuç kalmadı.\n");
    }

    #[tokio::test]
    async fn test_console_synthesizer_broken_writer() {
        let synth = ConsoleSynthesizer::with_writer(Box::new(BrokenPipe), 0);
        let result = synth.speak("Merhaba", "tr-TR").await;
        assert!(matches!(result, Err(SpeechError::OutputUnavailable(_))));
        assert!(!synth.is_speaking());
    }

    #[test]
    fn test_playback_duration() {
        let synth = ConsoleSynthesizer::with_writer(Box::new(std::io::sink()), 120);
        // 3 words at 120 wpm = 1.5s.
        assert_eq!(
            synth.playback_duration("bir iki üç"),
            Duration::from_millis(1500)
        );
        assert_eq!(synth.playback_duration(""), Duration::ZERO);

        let instant = ConsoleSynthesizer::with_writer(Box::new(std::io::sink()), 0);
        assert_eq!(instant.playback_duration("bir iki üç"), Duration::ZERO);
    }
}
