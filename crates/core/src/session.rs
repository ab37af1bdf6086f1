// SPDX-License-Identifier: MIT

//! Session identifier and record.

use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

crate::define_id! {
    /// Stable opaque identifier for a session.
    pub struct SessionId;
}

/// Orchestrator-level permission posture (GLOSSARY "Approval mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Agent plans but does not act.
    Plan,
    /// Agent may act with approval.
    AutoEdit,
    /// No approvals.
    Yolo,
}

impl ApprovalMode {
    pub fn is_yolo(self) -> bool {
        matches!(self, ApprovalMode::Yolo)
    }
}

/// Model tier requested for agent calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    High,
    Medium,
    Low,
    Unset,
}

/// Session run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Running,
    Intervention,
    Completed,
    Failed,
}

/// Chat-surface anchor for live-editing a streaming message (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnchor {
    pub chat_id: String,
    pub message_id: String,
}

/// A durable session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub workspace: PathBuf,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active_agent: Option<String>,
    pub active_skill: Option<String>,
    pub active_node: Option<String>,
    pub approval_mode: ApprovalMode,
    pub model_tier: ModelTier,
    pub cost_ceiling: Option<f64>,
    pub loop_count: u32,
    pub retry_count: u32,
    pub status: SessionStatus,
    /// Text to prepend to the next prompt (§4.1 action-loop subprotocol).
    pub pending_feedback: String,
    /// Role Cache: session role name -> agent-native session id.
    pub role_cache: HashMap<String, String>,
    pub chat_anchor: Option<ChatAnchor>,
    pub ephemeral: bool,
    pub archived: bool,
    pub task_link: Option<TaskId>,
}

impl Session {
    pub fn new(id: SessionId, workspace: PathBuf, now: DateTime<Utc>) -> Self {
        Self {
            id,
            workspace,
            title: String::new(),
            created_at: now,
            updated_at: now,
            active_agent: None,
            active_skill: None,
            active_node: None,
            approval_mode: ApprovalMode::AutoEdit,
            model_tier: ModelTier::Unset,
            cost_ceiling: None,
            loop_count: 0,
            retry_count: 0,
            status: SessionStatus::Idle,
            pending_feedback: String::new(),
            role_cache: HashMap::new(),
            chat_anchor: None,
            ephemeral: false,
            archived: false,
            task_link: None,
        }
    }

    /// Invariant (i): status=running or intervention implies active_node is non-empty.
    pub fn check_invariants(&self) -> Result<(), String> {
        if matches!(self.status, SessionStatus::Running | SessionStatus::Intervention)
            && self.active_node.as_deref().unwrap_or("").is_empty()
        {
            return Err(format!(
                "session {} has status {:?} but no active_node",
                self.id, self.status
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
