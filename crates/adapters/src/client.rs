// SPDX-License-Identifier: MIT

//! Agent Client Abstraction: a uniform streaming contract shared by the
//! three concrete transports.
//!
//! `Run(options, onChunk, onSessionID) -> (fullText, error)` becomes
//! [`AgentClient::run`] here; `onChunk`/`onSessionID` and the optional
//! `OnThought`/`OnToolEvent`/`OnIntent`/`OnPermission` hooks live on
//! [`RunOptions`] as boxed callbacks so every transport sees the same shape.

use crate::cancel::CancellationToken;
use crate::error::AgentClientError;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tenazas_core::{ApprovalMode, ModelTier};

pub type ChunkCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type SessionIdCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ThoughtCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ToolEventCallback = Arc<dyn Fn(&str, &str, &str) + Send + Sync>;
pub type IntentCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type PermissionFuture = Pin<Box<dyn Future<Output = PermissionResponse> + Send>>;
pub type PermissionCallback = Arc<dyn Fn(PermissionRequest) -> PermissionFuture + Send + Sync>;

/// One of the options offered by a server-initiated permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOption {
    pub id: String,
    pub kind: PermissionOptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOptionKind {
    AllowOnce,
    AllowAlways,
    RejectOnce,
    RejectAlways,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub tool_call: String,
    pub options: Vec<PermissionOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionResponse {
    Selected(String),
    Cancelled,
}

/// Auto-approval fallback used when a call provides no `OnPermission` hook.
pub fn auto_approve(request: &PermissionRequest) -> PermissionResponse {
    if let Some(opt) = request
        .options
        .iter()
        .find(|o| o.kind == PermissionOptionKind::AllowAlways)
    {
        return PermissionResponse::Selected(opt.id.clone());
    }
    if let Some(opt) = request
        .options
        .iter()
        .find(|o| o.kind == PermissionOptionKind::AllowOnce)
    {
        return PermissionResponse::Selected(opt.id.clone());
    }
    if let Some(opt) = request.options.first() {
        return PermissionResponse::Selected(opt.id.clone());
    }
    PermissionResponse::Cancelled
}

#[derive(Default, Clone)]
pub struct RunCallbacks {
    pub on_chunk: Option<ChunkCallback>,
    pub on_session_id: Option<SessionIdCallback>,
    pub on_thought: Option<ThoughtCallback>,
    pub on_tool_event: Option<ToolEventCallback>,
    pub on_intent: Option<IntentCallback>,
    pub on_permission: Option<PermissionCallback>,
}

impl RunCallbacks {
    pub fn emit_chunk(&self, text: &str) {
        if let Some(cb) = &self.on_chunk {
            cb(text);
        }
    }

    pub fn emit_session_id(&self, id: &str) {
        if let Some(cb) = &self.on_session_id {
            cb(id);
        }
    }

    pub fn emit_thought(&self, text: &str) {
        if let Some(cb) = &self.on_thought {
            cb(text);
        }
    }

    pub fn emit_tool_event(&self, name: &str, status: &str, detail: &str) {
        if let Some(cb) = &self.on_tool_event {
            cb(name, status, detail);
        }
    }

    pub fn emit_intent(&self, text: &str) {
        if let Some(cb) = &self.on_intent {
            cb(text);
        }
    }

    pub async fn resolve_permission(&self, request: PermissionRequest) -> PermissionResponse {
        match &self.on_permission {
            Some(cb) => cb(request).await,
            None => auto_approve(&request),
        }
    }
}

pub struct RunOptions {
    pub cancel: Option<CancellationToken>,
    /// Empty means "start a fresh conversation".
    pub native_session_id: Option<String>,
    pub prompt: String,
    pub workspace: PathBuf,
    pub approval_mode: ApprovalMode,
    pub yolo: bool,
    pub model_tier: ModelTier,
    pub budget_usd: Option<f64>,
    pub callbacks: RunCallbacks,
}

impl RunOptions {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }
}

/// Shared contract implemented by every concrete agent transport.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Run one prompt to completion, streaming chunks through
    /// `options.callbacks` and returning the concatenation of everything
    /// streamed through `on_chunk`.
    async fn run(&self, options: RunOptions) -> Result<String, AgentClientError>;
}

/// A static registry mapping agent name to constructed client, so
/// `registry.get("name")` returns a contract-violation error for unknown
/// names rather than panicking.
#[derive(Default)]
pub struct AgentClientRegistry {
    clients: std::collections::HashMap<String, Arc<dyn AgentClient>>,
}

impl AgentClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: std::collections::HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, client: Arc<dyn AgentClient>) {
        self.clients.insert(name.into(), client);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn AgentClient>, AgentClientError> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| AgentClientError::UnknownAgent(name.to_string()))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
