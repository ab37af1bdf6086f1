// SPDX-License-Identifier: MIT

//! Event bus payloads and audit entry kinds.

use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of audit entry kinds consumers switch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AuditKind {
    LlmPrompt,
    LlmChunk,
    LlmResponse,
    LlmThought,
    CmdResult,
    Status,
    Info,
    Intervention,
    /// Chosen next tool/action as declared by an ACP-style agent.
    Intent,
}

/// A single line in a session's append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    /// Role name, or the literal "engine"/"user".
    pub source: String,
    pub content: String,
    pub exit_code: Option<i32>,
}

impl AuditEntry {
    pub fn new(now: DateTime<Utc>, kind: AuditKind, source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp: now,
            kind,
            source: source.into(),
            content: content.into(),
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// Task-status payloads published alongside audit entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatusPayload {
    Started,
    Blocked {
        node: String,
        instruction: String,
        reason: String,
    },
    Completed,
    Failed {
        reason: String,
    },
}

/// An event delivered through the Event Bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusEvent {
    EventAudit {
        session_id: SessionId,
        entry: AuditEntry,
    },
    EventTaskStatus {
        session_id: SessionId,
        payload: TaskStatusPayload,
    },
}

impl BusEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            BusEvent::EventAudit { session_id, .. } => session_id,
            BusEvent::EventTaskStatus { session_id, .. } => session_id,
        }
    }
}
