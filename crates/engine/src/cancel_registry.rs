// SPDX-License-Identifier: MIT

//! Per-session cancellation token table.
//!
//! Every engine run loop and every `ExecutePrompt` registers a token here
//! keyed by session id; `CancelSession` fires it and the owning call
//! observes it at its next check. Tokens are unregistered on loop exit.

use parking_lot::Mutex;
use std::collections::HashMap;
use tenazas_adapters::CancellationToken;
use tenazas_core::SessionId;

#[derive(Default)]
pub struct CancelRegistry {
    tokens: Mutex<HashMap<SessionId, CancellationToken>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for `session_id`, replacing any stale one.
    pub fn register(&self, session_id: &SessionId) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.lock().insert(session_id.clone(), token.clone());
        token
    }

    pub fn unregister(&self, session_id: &SessionId) {
        self.tokens.lock().remove(session_id);
    }

    /// Fire the token registered for `session_id`, if any. Returns `true`
    /// if a live run was found and cancelled.
    pub fn cancel(&self, session_id: &SessionId) -> bool {
        match self.tokens.lock().get(session_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "cancel_registry_tests.rs"]
mod tests;
