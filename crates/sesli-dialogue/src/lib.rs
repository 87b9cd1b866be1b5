//! Sesli Dialogue crate - the voice search dialogue state machine.
//!
//! A session walks through a strict sequence of phases:
//! Idle -> Capturing -> Announcing -> AwaitingConfirmation -> ReadingDetail ->
//! AwaitingNext, returning to Idle when the results run out, when the user
//! clears the search, or when any speech failure ends the turn.
//!
//! [`DialogueMachine`] holds the pure transition rules; [`DialogueController`]
//! drives them with the speech engines and owns the single [`DialogueState`].

pub mod controller;
pub mod error;
pub mod machine;
pub mod prompts;
pub mod state;
pub mod vocabulary;

pub use controller::{DialogueController, DialogueHandle, DialogueSettings, SessionResult};
pub use error::DialogueError;
pub use machine::{DialogueMachine, Effect, Input, SessionOutcome};
pub use prompts::Prompts;
pub use sesli_core::types::Phase;
pub use state::DialogueState;
pub use vocabulary::{Reply, Vocabulary};
