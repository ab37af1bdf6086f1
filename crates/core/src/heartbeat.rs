// SPDX-License-Identifier: MIT

//! Heartbeat definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named, periodic reconciliation of a workspace's task graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatDef {
    pub name: String,
    /// Cron-like interval string (interpretation owned by the scheduler).
    pub interval: String,
    pub workspace: PathBuf,
    pub skills: Vec<String>,
}

impl HeartbeatDef {
    /// `heartbeat-<name>`.
    pub fn instance_id(&self) -> String {
        format!("heartbeat-{}", self.name)
    }
}
