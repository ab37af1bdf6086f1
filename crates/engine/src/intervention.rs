// SPDX-License-Identifier: MIT

//! Per-session intervention channel.
//!
//! When the engine escalates to intervention it registers a one-shot
//! waiter here and blocks on it; `retry` / `proceed_to_fail` / `abort`
//! resolve it from outside. Per spec.md §9 "Open questions", entries are
//! not eagerly reclaimed after a session terminates — a long-running
//! process accumulates one stale entry per session that ever blocked, and
//! this implementation accepts that leak rather than guessing at a
//! reclaim policy the spec leaves undecided.

use parking_lot::Mutex;
use std::collections::HashMap;
use tenazas_core::SessionId;
use tokio::sync::oneshot;

/// The three inputs an intervention can be resolved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterventionDecision {
    Retry,
    ProceedToFail,
    Abort,
}

#[derive(Default)]
pub struct InterventionRegistry {
    waiters: Mutex<HashMap<SessionId, oneshot::Sender<InterventionDecision>>>,
}

impl InterventionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new waiter for `session_id`, returning the receiver the
    /// engine blocks on. Replaces any previous (already-resolved) waiter.
    pub fn wait(&self, session_id: &SessionId) -> oneshot::Receiver<InterventionDecision> {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().insert(session_id.clone(), tx);
        rx
    }

    /// Resolve the waiter registered for `session_id`, if any is currently
    /// blocked. Returns `true` if a waiter was found and sent to.
    pub fn resolve(&self, session_id: &SessionId, decision: InterventionDecision) -> bool {
        match self.waiters.lock().remove(session_id) {
            Some(tx) => tx.send(decision).is_ok(),
            None => false,
        }
    }

    pub fn is_waiting(&self, session_id: &SessionId) -> bool {
        self.waiters.lock().contains_key(session_id)
    }
}

#[cfg(test)]
#[path = "intervention_tests.rs"]
mod tests;
