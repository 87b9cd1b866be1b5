//! Dialogue state record.
//!
//! A single `DialogueState` is owned by the controller and mutated only
//! through the methods below, which keep the cursor invariant:
//! in `AwaitingConfirmation` and `ReadingDetail` the result list is non-empty
//! and `cursor < results.len()`.

use serde::Serialize;

use sesli_core::types::{Phase, SearchResult};

use crate::error::DialogueError;

/// Phase, current result list and navigation cursor of a dialogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DialogueState {
    phase: Phase,
    results: Vec<SearchResult>,
    cursor: usize,
    last_query: Option<String>,
}

impl DialogueState {
    /// A fresh state in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// The result under the cursor, if any.
    pub fn current(&self) -> Option<&SearchResult> {
        self.results.get(self.cursor)
    }

    /// Move to `target`, validating the transition.
    pub fn transition(&mut self, target: Phase) -> Result<(), DialogueError> {
        if !self.phase.can_transition_to(&target) {
            return Err(DialogueError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }
        if target.holds_cursor() && self.current().is_none() {
            return Err(DialogueError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }
        tracing::debug!("Dialogue phase: {} -> {}", self.phase, target);
        self.phase = target;
        debug_assert!(self.is_consistent(), "cursor out of range in {}", target);
        Ok(())
    }

    /// Store the results of `query` and point the cursor at the first one.
    pub fn load_results(&mut self, query: impl Into<String>, results: Vec<SearchResult>) {
        self.last_query = Some(query.into());
        self.results = results;
        self.cursor = 0;
    }

    /// Move the cursor to the next result. Returns `false`, leaving the
    /// cursor in place, when the current result was the last one.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.results.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// End the session: back to `Idle` with no results. The last query is kept
    /// for display.
    pub fn end_session(&mut self) {
        if self.phase != Phase::Idle {
            tracing::debug!("Dialogue phase: {} -> {}", self.phase, Phase::Idle);
        }
        self.phase = Phase::Idle;
        self.results.clear();
        self.cursor = 0;
    }

    /// Forget everything, including the last query.
    pub fn reset(&mut self) {
        self.end_session();
        self.last_query = None;
    }

    /// Whether the cursor invariant holds.
    pub fn is_consistent(&self) -> bool {
        if self.phase.holds_cursor() {
            self.cursor < self.results.len()
        } else {
            self.cursor <= self.results.len()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
