//! Pure transition function of the voice dialogue.
//!
//! The machine never performs I/O. Each call to [`DialogueMachine::step`]
//! consumes one input (an activation, a typed query, the end of an utterance,
//! or the outcome of a capture session), mutates the state and returns the
//! single effect the controller must carry out next. The controller feeds the
//! completion of that effect back in as the next input.
//!
//! `Finish` and `Fail` leave the phase where it was: the session only returns
//! to `Idle` once the controller has spoken the closing line or error message.
//! Saying "clear" is the exception and resets the state at once.
//!
//! | phase | input | effect | next phase |
//! |---|---|---|---|
//! | Idle | activate | speak greeting | Capturing |
//! | Idle | query | search | Announcing / finish |
//! | Capturing | speech finished | listen | Capturing |
//! | Capturing | recognized | search | Announcing / finish |
//! | Announcing | speech finished | listen | AwaitingConfirmation |
//! | AwaitingConfirmation | yes | speak detail | ReadingDetail |
//! | AwaitingConfirmation | no | announce next / "no more" | Announcing / finish |
//! | AwaitingConfirmation | other | re-prompt | AwaitingConfirmation |
//! | ReadingDetail | speech finished | speak "next or clear" | AwaitingNext |
//! | AwaitingNext | next | announce next / "no more" | Announcing / finish |
//! | AwaitingNext | clear | finish | Idle |
//! | any | capture failure | fail | unchanged |

use std::sync::Arc;

use sesli_core::types::Phase;
use sesli_search::SearchIndex;
use sesli_speech::CaptureOutcome;

use crate::error::DialogueError;
use crate::prompts::Prompts;
use crate::state::DialogueState;
use crate::vocabulary::{Reply, Vocabulary};

/// One input to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Start a spoken session with a greeting.
    Activate,
    /// Start a session from a typed query.
    Query(String),
    /// The last `Speak` or `Reprompt` finished playing.
    SpeechFinished,
    /// The last `Listen` ended.
    Captured(CaptureOutcome),
}

impl Input {
    fn name(&self) -> &'static str {
        match self {
            Input::Activate => "activation",
            Input::Query(_) => "query",
            Input::SpeechFinished => "speech completion",
            Input::Captured(_) => "capture outcome",
        }
    }
}

/// How a session came back to `Idle` without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The dialogue ran its course (no results, no more results, or the user
    /// said "clear").
    Finished,
    /// `clear_search` interrupted the session.
    Cleared,
    /// The capture or utterance was aborted from outside the dialogue.
    Aborted,
}

/// What the controller must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Speak, then report `SpeechFinished`.
    Speak(String),
    /// An answer was not understood: speak the hint, then report
    /// `SpeechFinished`. The phase is unchanged.
    Reprompt(String),
    /// Open a capture session, then report `Captured`.
    Listen,
    /// The session is over. Speak the closing line, if any, then end the
    /// session.
    Finish {
        closing: Option<String>,
        outcome: SessionOutcome,
    },
    /// The turn ended with an error. Surface it, then end the session.
    Fail(DialogueError),
}

/// Search index, vocabulary and prompts the transitions consult.
#[derive(Debug, Clone)]
pub struct DialogueMachine {
    index: Arc<SearchIndex>,
    vocabulary: Vocabulary,
    prompts: Prompts,
}

impl DialogueMachine {
    pub fn new(index: Arc<SearchIndex>, vocabulary: Vocabulary, prompts: Prompts) -> Self {
        Self {
            index,
            vocabulary,
            prompts,
        }
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Apply `input` to `state`.
    ///
    /// An input that makes no sense in the current phase is rejected without
    /// touching the state.
    pub fn step(&self, state: &mut DialogueState, input: Input) -> Result<Effect, DialogueError> {
        let phase = state.phase();
        let unexpected = DialogueError::UnexpectedInput {
            phase,
            input: input.name(),
        };

        match (phase, input) {
            (Phase::Idle, Input::Activate) => {
                state.transition(Phase::Capturing)?;
                Ok(Effect::Speak(self.prompts.greeting().to_string()))
            }
            (Phase::Idle, Input::Query(text)) => {
                // A typed query stands in for the first capture.
                state.transition(Phase::Capturing)?;
                Ok(self.run_query(state, &text))
            }

            (_, Input::Captured(outcome)) if phase != Phase::Idle => {
                self.on_captured(state, outcome)
            }

            (Phase::Capturing, Input::SpeechFinished) => Ok(Effect::Listen),
            (Phase::Announcing, Input::SpeechFinished) => {
                state.transition(Phase::AwaitingConfirmation)?;
                Ok(Effect::Listen)
            }
            (Phase::AwaitingConfirmation, Input::SpeechFinished) => Ok(Effect::Listen),
            (Phase::ReadingDetail, Input::SpeechFinished) => {
                state.transition(Phase::AwaitingNext)?;
                Ok(Effect::Speak(self.prompts.next_or_clear().to_string()))
            }
            (Phase::AwaitingNext, Input::SpeechFinished) => Ok(Effect::Listen),

            _ => Err(unexpected),
        }
    }

    fn on_captured(
        &self,
        state: &mut DialogueState,
        outcome: CaptureOutcome,
    ) -> Result<Effect, DialogueError> {
        let text = match outcome {
            CaptureOutcome::Recognized(text) => text,
            CaptureOutcome::NoSpeechDetected => {
                return Ok(Effect::Fail(DialogueError::NoSpeechDetected))
            }
            CaptureOutcome::Denied => return Ok(Effect::Fail(DialogueError::PermissionDenied)),
            CaptureOutcome::DeviceBusy => return Ok(Effect::Fail(DialogueError::DeviceBusy)),
            CaptureOutcome::Aborted => {
                return Ok(Effect::Finish {
                    closing: None,
                    outcome: SessionOutcome::Aborted,
                });
            }
        };

        match state.phase() {
            Phase::Capturing => Ok(self.run_query(state, &text)),
            Phase::AwaitingConfirmation => match self.vocabulary.confirmation(&text) {
                Reply::Affirm => {
                    state.transition(Phase::ReadingDetail)?;
                    let detail = state
                        .current()
                        .map(|r| self.prompts.detail(r))
                        .unwrap_or_default();
                    Ok(Effect::Speak(detail))
                }
                Reply::Deny => self.advance(state),
                _ => Ok(Effect::Reprompt(self.prompts.not_understood().to_string())),
            },
            Phase::AwaitingNext => match self.vocabulary.navigation(&text) {
                Reply::Next => self.advance(state),
                Reply::Clear => {
                    state.reset();
                    Ok(Effect::Finish {
                        closing: None,
                        outcome: SessionOutcome::Finished,
                    })
                }
                _ => Ok(Effect::Reprompt(self.prompts.next_or_clear().to_string())),
            },
            phase => Err(DialogueError::UnexpectedInput {
                phase,
                input: "capture outcome",
            }),
        }
    }

    fn run_query(&self, state: &mut DialogueState, query: &str) -> Effect {
        let results = self.index.search(query);
        tracing::info!(
            query = %query,
            result_count = results.len(),
            "Search results loaded"
        );
        state.load_results(query.trim(), results);

        let Some(first) = state.current().cloned() else {
            return Effect::Finish {
                closing: Some(self.prompts.no_results().to_string()),
                outcome: SessionOutcome::Finished,
            };
        };

        if let Err(err) = state.transition(Phase::Announcing) {
            return Effect::Fail(err);
        }
        Effect::Speak(self.prompts.announcement(0, &first))
    }

    fn advance(&self, state: &mut DialogueState) -> Result<Effect, DialogueError> {
        if !state.advance() {
            return Ok(Effect::Finish {
                closing: Some(self.prompts.no_more_results().to_string()),
                outcome: SessionOutcome::Finished,
            });
        }
        state.transition(Phase::Announcing)?;
        let cursor = state.cursor();
        let announcement = state
            .current()
            .map(|r| self.prompts.announcement(cursor, r))
            .unwrap_or_default();
        Ok(Effect::Speak(announcement))
    }
}

// =============================================================================
// Tests
// =============================================================================
