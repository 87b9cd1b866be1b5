//! One-session-at-a-time gate shared by the speech engines.
//!
//! A gate admits a single session. A second `try_begin` while a session is
//! open is refused, and `cancel` trips the open session's token. Dropping the
//! session reopens the gate, which is how engines release their device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Admission control for an exclusive speech resource.
#[derive(Debug, Default)]
pub struct ExclusiveGate {
    active: AtomicBool,
    token: Mutex<Option<CancellationToken>>,
}

impl ExclusiveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session, or return `None` if one is already open.
    pub fn try_begin(&self) -> Option<GateSession<'_>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        let token = CancellationToken::new();
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Some(GateSession { gate: self, token })
    }

    /// Cancel the open session. Returns `false` if none was open.
    pub fn cancel(&self) -> bool {
        let guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// An open session. Closing happens on drop.
#[derive(Debug)]
pub struct GateSession<'a> {
    gate: &'a ExclusiveGate,
    token: CancellationToken,
}

impl GateSession<'_> {
    /// Token tripped by [`ExclusiveGate::cancel`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for GateSession<'_> {
    fn drop(&mut self) {
        *self
            .gate
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.gate.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_admits_one_session() {
        let gate = ExclusiveGate::new();
        let first = gate.try_begin();
        assert!(first.is_some());
        assert!(gate.is_active());
        assert!(gate.try_begin().is_none());
    }

    #[test]
    fn test_gate_reopens_on_drop() {
        let gate = ExclusiveGate::new();
        {
            let _session = gate.try_begin().unwrap();
        }
        assert!(!gate.is_active());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_cancel_trips_open_session() {
        let gate = ExclusiveGate::new();
        let session = gate.try_begin().unwrap();
        assert!(!session.token().is_cancelled());
        assert!(gate.cancel());
        assert!(session.token().is_cancelled());
    }

    #[test]
    fn test_cancel_without_session_is_noop() {
        let gate = ExclusiveGate::new();
        assert!(!gate.cancel());
        // A stale cancel must not leak into the next session.
        let session = gate.try_begin().unwrap();
        assert!(!session.token().is_cancelled());
    }
}
