// SPDX-License-Identifier: MIT

//! Registry row: per-instance ephemeral focus state.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// UI verbosity level for a given instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Low,
    Medium,
    High,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Medium
    }
}

/// A staged multi-step UI input (e.g. rename-by-reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub action: String,
    pub data: serde_json::Value,
}

/// A single registry row, keyed by instance id (e.g. `"cli-<pid>"` or `"tg-<chatid>"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceState {
    pub focused_session: Option<SessionId>,
    #[serde(default)]
    pub verbosity: Verbosity,
    pub pending_action: Option<PendingAction>,
}
