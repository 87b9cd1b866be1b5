//! Sesli Speech crate - speech synthesis and recognition boundaries.
//!
//! Provides trait-based abstractions for text-to-speech (`SpeechOutput`) and
//! speech-to-text (`SpeechInput`), the exclusivity gate both rely on, a
//! console synthesizer and a channel-fed recognizer for the terminal front-end,
//! and mock implementations for tests that need no audio hardware.

pub mod error;
pub mod gate;
pub mod input;
pub mod output;

pub use error::SpeechError;
pub use gate::{ExclusiveGate, GateSession};
pub use input::{CaptureOutcome, ChannelRecognizer, RecognizerEvent, RecognizerFeed, SpeechInput};
pub use output::{ConsoleSynthesizer, MockSpeechOutput, Playback, SpeechOutput};
