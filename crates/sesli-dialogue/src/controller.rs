//! Async dialogue controller.
//!
//! The controller owns the [`DialogueState`] and runs one session at a time.
//! Every suspension point (an utterance, the pause before listening, a capture
//! session) is awaited together with the command channel, so a
//! `clear_search` arriving mid-session drops the pending operation, aborts the
//! engines and returns to `Idle` at once. Start requests that arrive while a
//! session runs are refused with [`DialogueError::SessionActive`].
//!
//! Callers talk to the controller through a cloneable [`DialogueHandle`]:
//!
//! ```ignore
//! let (controller, handle) = DialogueController::from_config(index, output, input, &config);
//! tokio::spawn(controller.run());
//! let outcome = handle.activate().await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sesli_core::config::{SesliConfig, SpeechConfig};
use sesli_core::events::DialogueEvent;
use sesli_core::types::Phase;
use sesli_search::SearchIndex;
use sesli_speech::{CaptureOutcome, Playback, SpeechInput, SpeechOutput};

use crate::error::DialogueError;
use crate::machine::{DialogueMachine, Effect, Input, SessionOutcome};
use crate::prompts::Prompts;
use crate::state::DialogueState;
use crate::vocabulary::Vocabulary;

/// Capacity of the command channel from handles to the controller.
const COMMAND_CAPACITY: usize = 32;

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 256;

/// Speech parameters of a dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSettings {
    /// Language tag handed to both speech engines.
    pub language: String,
    /// Capture session timeout.
    pub capture_timeout: Duration,
    /// Pause between the end of an utterance and the start of listening.
    pub resume_delay: Duration,
}

impl DialogueSettings {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            capture_timeout: Duration::from_millis(config.capture_timeout_ms),
            resume_delay: Duration::from_millis(config.resume_delay_ms),
        }
    }
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self::from_config(&SpeechConfig::default())
    }
}

/// How a session or start request ended.
pub type SessionResult = Result<SessionOutcome, DialogueError>;

#[derive(Debug)]
enum Command {
    Start {
        input: Input,
        reply: oneshot::Sender<SessionResult>,
    },
    Clear {
        done: oneshot::Sender<()>,
    },
    Shutdown,
}

/// A command that cut a session short.
enum Interrupt {
    Clear(oneshot::Sender<()>),
    Shutdown,
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable front door to a running [`DialogueController`].
#[derive(Debug, Clone)]
pub struct DialogueHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<DialogueEvent>,
    state: watch::Receiver<DialogueState>,
}

impl DialogueHandle {
    /// Start a spoken session and wait until it returns to `Idle`.
    ///
    /// # Errors
    /// * `SessionActive` if a session is already running.
    /// * The terminal error of the turn (`NoSpeechDetected`, `PermissionDenied`,
    ///   ...) after its message has been surfaced.
    /// * `Stopped` if the controller is gone.
    pub async fn activate(&self) -> SessionResult {
        self.start(Input::Activate).await
    }

    /// Start a session from typed text: the greeting and the first capture are
    /// skipped and `text` is searched right away.
    pub async fn submit_query(&self, text: impl Into<String>) -> SessionResult {
        self.start(Input::Query(text.into())).await
    }

    async fn start(&self, input: Input) -> SessionResult {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Start { input, reply })
            .await
            .map_err(|_| DialogueError::Stopped)?;
        rx.await.map_err(|_| DialogueError::Stopped)?
    }

    /// Abort any capture or utterance in flight and reset the dialogue to
    /// `Idle` with no results. Resolves once the reset has happened.
    pub async fn clear_search(&self) -> Result<(), DialogueError> {
        let (done, rx) = oneshot::channel();
        self.commands
            .send(Command::Clear { done })
            .await
            .map_err(|_| DialogueError::Stopped)?;
        rx.await.map_err(|_| DialogueError::Stopped)
    }

    /// Ask the controller to stop. A running session ends with `Stopped`.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    /// Snapshot of the dialogue state.
    pub fn state(&self) -> DialogueState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DialogueEvent> {
        self.events.subscribe()
    }

    /// Wait until the dialogue reaches `phase`.
    pub async fn wait_for_phase(&self, phase: Phase) -> Result<(), DialogueError> {
        let mut state = self.state.clone();
        state
            .wait_for(|s| s.phase() == phase)
            .await
            .map(|_| ())
            .map_err(|_| DialogueError::Stopped)
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Drives [`DialogueMachine`] with real speech engines.
pub struct DialogueController<O, I> {
    machine: DialogueMachine,
    output: O,
    input: I,
    settings: DialogueSettings,
    state: DialogueState,
    published_phase: Phase,
    session_id: Option<Uuid>,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<DialogueEvent>,
    state_tx: watch::Sender<DialogueState>,
}

impl<O, I> std::fmt::Debug for DialogueController<O, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueController")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .finish()
    }
}

impl<O: SpeechOutput, I: SpeechInput> DialogueController<O, I> {
    /// Create a controller in `Idle` and the handle that drives it.
    pub fn new(
        machine: DialogueMachine,
        output: O,
        input: I,
        settings: DialogueSettings,
    ) -> (Self, DialogueHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, state_rx) = watch::channel(DialogueState::new());

        let handle = DialogueHandle {
            commands: command_tx,
            events: events.clone(),
            state: state_rx,
        };
        let controller = Self {
            machine,
            output,
            input,
            settings,
            state: DialogueState::new(),
            published_phase: Phase::Idle,
            session_id: None,
            commands: command_rx,
            events,
            state_tx,
        };
        (controller, handle)
    }

    /// Build the machine and settings from configuration.
    pub fn from_config(
        index: Arc<SearchIndex>,
        output: O,
        input: I,
        config: &SesliConfig,
    ) -> (Self, DialogueHandle) {
        let machine = DialogueMachine::new(
            index,
            Vocabulary::from_config(&config.dialogue),
            Prompts::new(config.dialogue.prompts.clone()),
        );
        Self::new(
            machine,
            output,
            input,
            DialogueSettings::from_config(&config.speech),
        )
    }

    /// Serve commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(language = %self.settings.language, "Dialogue controller started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Start { input, reply } => {
                    let result = self.run_session(input).await;
                    let stopped = matches!(result, Err(DialogueError::Stopped));
                    let _ = reply.send(result);
                    if stopped {
                        break;
                    }
                }
                Command::Clear { done } => {
                    self.clear();
                    let _ = done.send(());
                }
                Command::Shutdown => break,
            }
        }

        self.output.cancel();
        self.input.abort();
        info!("Dialogue controller stopped");
    }

    async fn run_session(&mut self, first: Input) -> SessionResult {
        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        info!(session_id = %session_id, input = ?first, "Dialogue session started");
        self.emit(DialogueEvent::SessionStarted {
            session_id,
            timestamp: Utc::now(),
        });

        let mut next = first;
        loop {
            let phase = self.state.phase();
            let heard = match &next {
                Input::Captured(CaptureOutcome::Recognized(text)) => Some(text.clone()),
                _ => None,
            };
            if let Some(text) = &heard {
                self.emit(DialogueEvent::Heard {
                    text: text.clone(),
                    timestamp: Utc::now(),
                });
            }
            let searched = matches!(
                (phase, &next),
                (Phase::Idle, Input::Query(_))
                    | (Phase::Capturing, Input::Captured(CaptureOutcome::Recognized(_)))
            );

            let effect = match self.machine.step(&mut self.state, next) {
                Ok(effect) => effect,
                Err(err) => {
                    error!(error = %err, phase = %phase, "Dialogue input rejected");
                    return self.fail(err).await;
                }
            };
            self.publish();
            if searched {
                self.emit(DialogueEvent::ResultsFound {
                    query: self.state.last_query().unwrap_or_default().to_string(),
                    result_ids: self.state.results().iter().map(|r| r.id()).collect(),
                    timestamp: Utc::now(),
                });
            }

            next = match effect {
                Effect::Speak(text) => match self.say(&text).await {
                    Ok(()) => Input::SpeechFinished,
                    Err(exit) => return exit,
                },
                Effect::Reprompt(text) => {
                    debug!(phase = %phase, "Answer not understood, re-prompting");
                    self.emit(DialogueEvent::NotUnderstood {
                        text: heard.unwrap_or_default(),
                        phase,
                        timestamp: Utc::now(),
                    });
                    match self.say(&text).await {
                        Ok(()) => Input::SpeechFinished,
                        Err(exit) => return exit,
                    }
                }
                Effect::Listen => match self.listen().await {
                    Ok(input) => input,
                    Err(exit) => return exit,
                },
                Effect::Finish { closing, outcome } => return self.finish(closing, outcome).await,
                Effect::Fail(err) => return self.fail(err).await,
            };
        }
    }

    /// Speak `text` and wait for it to finish.
    async fn say(&mut self, text: &str) -> Result<(), SessionResult> {
        let phase = self.state.phase();
        let spoken = interruptible(
            &mut self.commands,
            phase,
            self.output.speak(text, &self.settings.language),
        )
        .await;

        match spoken {
            Err(interrupt) => Err(self.interrupted(interrupt)),
            Ok(Ok(Playback::Completed)) => {
                self.emit(DialogueEvent::Spoke {
                    text: text.to_string(),
                    timestamp: Utc::now(),
                });
                Ok(())
            }
            Ok(Ok(Playback::Cancelled)) => {
                info!("Utterance cancelled outside the dialogue, ending session");
                self.state.end_session();
                self.publish();
                Err(self.end(SessionOutcome::Aborted))
            }
            Ok(Err(err)) => Err(self.fail(err.into()).await),
        }
    }

    /// Open a capture session after the resume delay.
    async fn listen(&mut self) -> Result<Input, SessionResult> {
        let phase = self.state.phase();

        if !self.settings.resume_delay.is_zero() {
            let pause = tokio::time::sleep(self.settings.resume_delay);
            if let Err(interrupt) = interruptible(&mut self.commands, phase, pause).await {
                return Err(self.interrupted(interrupt));
            }
        }

        let captured = interruptible(
            &mut self.commands,
            phase,
            self.input
                .capture(&self.settings.language, self.settings.capture_timeout),
        )
        .await;

        match captured {
            Err(interrupt) => Err(self.interrupted(interrupt)),
            Ok(Ok(outcome)) => {
                debug!(phase = %phase, outcome = %outcome, "Capture finished");
                Ok(Input::Captured(outcome))
            }
            Ok(Err(err)) => Err(self.fail(err.into()).await),
        }
    }

    /// Speak the closing line, then return to `Idle`.
    async fn finish(&mut self, closing: Option<String>, outcome: SessionOutcome) -> SessionResult {
        if let Some(text) = closing {
            if let Err(exit) = self.say(&text).await {
                return exit;
            }
        }
        self.state.end_session();
        self.publish();
        self.end(outcome)
    }

    fn end(&mut self, outcome: SessionOutcome) -> SessionResult {
        if let Some(session_id) = self.session_id.take() {
            info!(session_id = %session_id, outcome = ?outcome, "Dialogue session ended");
            self.emit(DialogueEvent::SessionEnded {
                session_id,
                timestamp: Utc::now(),
            });
        }
        Ok(outcome)
    }

    /// End the turn with `err`: one user-facing message, then back to `Idle`.
    ///
    /// The message is always published as an `ErrorSurfaced` event and is also
    /// spoken unless the output itself is what failed. Input heard during the
    /// failed turn is dropped.
    async fn fail(&mut self, err: DialogueError) -> SessionResult {
        warn!(error = %err, kind = err.kind(), "Dialogue turn failed");
        let phase = self.state.phase();

        let message = self.machine.prompts().error_message(&err).to_string();
        self.emit(DialogueEvent::ErrorSurfaced {
            kind: err.kind().to_string(),
            message: message.clone(),
            timestamp: Utc::now(),
        });

        let speakable = !matches!(
            err,
            DialogueError::OutputUnavailable(_) | DialogueError::AlreadySpeaking
        );
        if speakable {
            let spoken = interruptible(
                &mut self.commands,
                phase,
                self.output.speak(&message, &self.settings.language),
            )
            .await;
            match spoken {
                Err(interrupt) => return self.interrupted(interrupt),
                Ok(Ok(Playback::Completed)) => self.emit(DialogueEvent::Spoke {
                    text: message,
                    timestamp: Utc::now(),
                }),
                Ok(Ok(Playback::Cancelled)) => {}
                Ok(Err(speak_err)) => {
                    warn!(error = %speak_err, "Error message could not be spoken");
                }
            }
        }

        self.input.discard_pending();
        self.state.end_session();
        self.publish();
        if let Some(session_id) = self.session_id.take() {
            self.emit(DialogueEvent::SessionEnded {
                session_id,
                timestamp: Utc::now(),
            });
        }
        Err(err)
    }

    fn interrupted(&mut self, interrupt: Interrupt) -> SessionResult {
        self.output.cancel();
        self.input.abort();
        match interrupt {
            Interrupt::Clear(done) => {
                self.clear();
                let _ = done.send(());
                Ok(SessionOutcome::Cleared)
            }
            Interrupt::Shutdown => {
                self.state.end_session();
                self.publish();
                self.session_id = None;
                Err(DialogueError::Stopped)
            }
        }
    }

    /// Reset to `Idle` with no results. Calling it again changes nothing.
    fn clear(&mut self) {
        self.output.cancel();
        self.input.abort();
        self.state.reset();
        self.session_id = None;
        self.publish();
        info!("Search cleared");
        self.emit(DialogueEvent::Cleared {
            timestamp: Utc::now(),
        });
    }

    /// Share the current state and announce a phase change, if any.
    fn publish(&mut self) {
        let phase = self.state.phase();
        if phase != self.published_phase {
            self.emit(DialogueEvent::PhaseChanged {
                from: self.published_phase,
                to: phase,
                timestamp: Utc::now(),
            });
            self.published_phase = phase;
        }
        self.state_tx.send_replace(self.state.clone());
    }

    fn emit(&self, event: DialogueEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Await `operation` while serving commands that may interrupt it.
///
/// `Clear` and `Shutdown` (or a closed channel) abandon the operation; start
/// requests are refused and waiting continues.
async fn interruptible<F: Future>(
    commands: &mut mpsc::Receiver<Command>,
    phase: Phase,
    operation: F,
) -> Result<F::Output, Interrupt> {
    tokio::pin!(operation);
    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::Clear { done }) => return Err(Interrupt::Clear(done)),
                Some(Command::Start { reply, .. }) => {
                    warn!(phase = %phase, "Start request refused, a session is running");
                    let _ = reply.send(Err(DialogueError::SessionActive(phase)));
                }
                Some(Command::Shutdown) | None => return Err(Interrupt::Shutdown),
            },
            output = &mut operation => return Ok(output),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
