// SPDX-License-Identifier: MIT

//! Variant B of the Agent Client: the long-lived JSON-RPC 2.0 peer.
//! One child process is spawned on first use
//! and reused for every later call in this orchestrator process. A single
//! reader task consumes stdout, multiplexing replies to waiters by request
//! id and notifications to the active call registered under the matching
//! session id; writes to stdin are serialized by a dedicated mutex.

use crate::client::{
    AgentClient, PermissionOption, PermissionOptionKind, PermissionRequest, PermissionResponse,
    RunOptions,
};
use crate::error::AgentClientError;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex as SyncMutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tenazas_core::{ApprovalMode, ModelTier};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};

const STDERR_TAIL_BYTES: usize = 256;

fn mode_uri(mode: ApprovalMode) -> &'static str {
    match mode {
        ApprovalMode::Plan => "#plan",
        ApprovalMode::AutoEdit => "#agent",
        ApprovalMode::Yolo => "#autopilot",
    }
}

fn model_string(tier: ModelTier) -> &'static str {
    match tier {
        ModelTier::High => "high",
        ModelTier::Medium => "medium",
        ModelTier::Low => "low",
        ModelTier::Unset => "default",
    }
}

/// A message the reader task hands to the `run()` call bound to a session.
enum SessionEvent {
    MessageChunk(String),
    ThoughtChunk(String),
    ToolEvent {
        name: String,
        status: String,
        detail: String,
        title: Option<String>,
    },
    PermissionRequest {
        rpc_id: u64,
        request: PermissionRequest,
    },
}

struct Connection {
    stdin: AsyncMutex<ChildStdin>,
    /// Kept alive only so the process is reaped (and `kill_on_drop` fires)
    /// when the connection itself is dropped; never polled directly.
    _child: AsyncMutex<Child>,
    next_id: AtomicU64,
    replies: Arc<DashMap<u64, oneshot::Sender<Result<Value, String>>>>,
    sessions: Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>>,
    loaded_native_sessions: Arc<DashMap<String, ()>>,
    stderr_tail: Arc<SyncMutex<Vec<u8>>>,
}

impl Connection {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, AgentClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.replies.insert(id, tx);
        let envelope = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        self.write_line(&envelope).await?;
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(AgentClientError::Protocol(message)),
            Err(_) => {
                let tail = String::from_utf8_lossy(&self.stderr_tail.lock()).to_string();
                Err(AgentClientError::ProcessExited(tail))
            }
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), AgentClientError> {
        let envelope = json!({"jsonrpc": "2.0", "method": method, "params": params});
        self.write_line(&envelope).await
    }

    async fn send_response(&self, id: u64, result: Value) -> Result<(), AgentClientError> {
        let envelope = json!({"jsonrpc": "2.0", "id": id, "result": result});
        self.write_line(&envelope).await
    }

    async fn write_line(&self, value: &Value) -> Result<(), AgentClientError> {
        let mut line = serde_json::to_string(value).map_err(|e| AgentClientError::Protocol(e.to_string()))?;
        line.push('\n');
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(AgentClientError::Io)
    }
}

/// Long-lived ACP peer client. Cheap to clone; the underlying process is
/// shared via `Arc` and started lazily on first `run()`.
#[derive(Clone)]
pub struct AcpClient {
    binary: &'static str,
    connection: Arc<AsyncMutex<Option<Arc<Connection>>>>,
}

impl AcpClient {
    pub fn new(binary: &'static str) -> Self {
        Self {
            binary,
            connection: Arc::new(AsyncMutex::new(None)),
        }
    }

    async fn connection(&self) -> Result<Arc<Connection>, AgentClientError> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(Arc::clone(conn));
        }
        let conn = self.spawn_and_initialize().await?;
        *guard = Some(Arc::clone(&conn));
        Ok(conn)
    }

    async fn spawn_and_initialize(&self) -> Result<Arc<Connection>, AgentClientError> {
        let mut child = tokio::process::Command::new(self.binary)
            .arg("--acp")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AgentClientError::Spawn(e.to_string()))?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        let replies: Arc<DashMap<u64, oneshot::Sender<Result<Value, String>>>> =
            Arc::new(DashMap::new());
        let sessions: Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>> =
            Arc::new(DashMap::new());
        let stderr_tail = Arc::new(SyncMutex::new(Vec::new()));

        let conn = Arc::new(Connection {
            stdin: AsyncMutex::new(stdin),
            _child: AsyncMutex::new(child),
            next_id: AtomicU64::new(1),
            replies: Arc::clone(&replies),
            sessions: Arc::clone(&sessions),
            loaded_native_sessions: Arc::new(DashMap::new()),
            stderr_tail: Arc::clone(&stderr_tail),
        });

        spawn_stderr_tail_task(stderr, Arc::clone(&stderr_tail));
        spawn_reader_task(stdout, Arc::clone(&replies), Arc::clone(&sessions), Arc::clone(&conn));

        conn.send_request("initialize", json!({"protocolVersion": 1}))
            .await?;
        Ok(conn)
    }
}

fn spawn_stderr_tail_task(stderr: tokio::process::ChildStderr, tail: Arc<SyncMutex<Vec<u8>>>) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        loop {
            let mut chunk = vec![0u8; 4096];
            use tokio::io::AsyncReadExt;
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.len() > STDERR_TAIL_BYTES {
                        let start = buf.len() - STDERR_TAIL_BYTES;
                        buf.drain(..start);
                    }
                }
            }
        }
        *tail.lock() = buf;
    });
}

fn spawn_reader_task(
    stdout: tokio::process::ChildStdout,
    replies: Arc<DashMap<u64, oneshot::Sender<Result<Value, String>>>>,
    sessions: Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>>,
    conn: Arc<Connection>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
                continue;
            };
            dispatch_incoming(value, &replies, &sessions, &conn).await;
        }
        // Process exited: dropping every reply sender here fails each
        // outstanding `send_request` waiter with `ProcessExited`.
        replies.clear();
    });
}

async fn dispatch_incoming(
    value: Value,
    replies: &Arc<DashMap<u64, oneshot::Sender<Result<Value, String>>>>,
    sessions: &Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>>,
    conn: &Arc<Connection>,
) {
    let id = value.get("id").and_then(Value::as_u64);
    let method = value.get("method").and_then(Value::as_str).map(str::to_string);

    if method.is_none() {
        // A reply to one of our requests.
        if let Some(id) = id {
            if let Some((_, tx)) = replies.remove(&id) {
                if let Some(err) = value.get("error") {
                    let _ = tx.send(Err(err.to_string()));
                } else {
                    let _ = tx.send(Ok(value.get("result").cloned().unwrap_or(Value::Null)));
                }
            }
        }
        return;
    }

    let method = method.unwrap();
    let params = value.get("params").cloned().unwrap_or(Value::Null);

    match (method.as_str(), id) {
        ("session/update", None) => handle_session_update(params, sessions),
        ("session/request_permission", Some(rpc_id)) => {
            handle_permission_request(rpc_id, params, sessions, conn).await
        }
        _ => {} // unknown discriminators/methods are ignored
    }
}

fn handle_session_update(
    params: Value,
    sessions: &Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>>,
) {
    let Some(session_id) = params.get("sessionId").and_then(Value::as_str) else {
        return;
    };
    let Some(tx) = sessions.get(session_id).map(|e| e.clone()) else {
        return;
    };
    let Some(update) = params.get("update") else {
        return;
    };
    let discriminator = update.get("sessionUpdate").and_then(Value::as_str).unwrap_or("");
    match discriminator {
        "agent_message_chunk" => {
            if let Some(text) = extract_text(update) {
                let _ = tx.send(SessionEvent::MessageChunk(text));
            }
        }
        "agent_thought_chunk" => {
            if let Some(text) = extract_text(update) {
                let _ = tx.send(SessionEvent::ThoughtChunk(text));
            }
        }
        "tool_call" | "tool_call_update" => {
            let name = update.get("toolCallId").and_then(Value::as_str).unwrap_or("").to_string();
            let status = update.get("status").and_then(Value::as_str).unwrap_or("").to_string();
            let detail = update.get("content").map(|v| v.to_string()).unwrap_or_default();
            let title = update.get("title").and_then(Value::as_str).map(str::to_string);
            let _ = tx.send(SessionEvent::ToolEvent { name, status, detail, title });
        }
        _ => {}
    }
}

fn extract_text(update: &Value) -> Option<String> {
    update
        .get("content")
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

async fn handle_permission_request(
    rpc_id: u64,
    params: Value,
    sessions: &Arc<DashMap<String, mpsc::UnboundedSender<SessionEvent>>>,
    conn: &Arc<Connection>,
) {
    let session_id = params.get("sessionId").and_then(Value::as_str).unwrap_or("").to_string();
    let tool_call = params
        .get("toolCall")
        .map(|v| v.to_string())
        .unwrap_or_default();
    let options: Vec<PermissionOption> = params
        .get("options")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|o| {
                    let id = o.get("optionId").and_then(Value::as_str)?.to_string();
                    let kind = match o.get("kind").and_then(Value::as_str).unwrap_or("") {
                        "allow_once" => PermissionOptionKind::AllowOnce,
                        "allow_always" => PermissionOptionKind::AllowAlways,
                        "reject_once" => PermissionOptionKind::RejectOnce,
                        "reject_always" => PermissionOptionKind::RejectAlways,
                        _ => return None,
                    };
                    Some(PermissionOption { id, kind })
                })
                .collect()
        })
        .unwrap_or_default();
    let request = PermissionRequest { tool_call, options };

    let Some(tx) = sessions.get(&session_id).map(|e| e.clone()) else {
        // No active call bound to this session; respond cancelled.
        let _ = conn
            .send_response(rpc_id, json!({"outcome": {"outcome": "cancelled"}}))
            .await;
        return;
    };
    let _ = tx.send(SessionEvent::PermissionRequest { rpc_id, request });
}

#[async_trait]
impl AgentClient for AcpClient {
    async fn run(&self, options: RunOptions) -> Result<String, AgentClientError> {
        let conn = self.connection().await?;

        let session_id = match &options.native_session_id {
            Some(native) => {
                if conn.loaded_native_sessions.insert(native.clone(), ()).is_none() {
                    conn.send_request("session/load", json!({"sessionId": native})).await?;
                }
                native.clone()
            }
            None => {
                let result = conn.send_request("session/new", json!({})).await?;
                let id = result
                    .get("sessionId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AgentClientError::Protocol("session/new missing sessionId".to_string()))?
                    .to_string();
                options.callbacks.emit_session_id(&id);
                id
            }
        };

        let _ = conn
            .send_request(
                "session/set_mode",
                json!({"sessionId": session_id, "modeId": mode_uri(options.approval_mode)}),
            )
            .await;
        let _ = conn
            .send_request(
                "session/set_model",
                json!({"sessionId": session_id, "model": model_string(options.model_tier)}),
            )
            .await;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        conn.sessions.insert(session_id.clone(), event_tx);

        let prompt_params = json!({
            "sessionId": session_id,
            "prompt": [{"type": "text", "text": options.prompt}],
        });
        let conn_for_prompt = Arc::clone(&conn);
        let mut prompt_call = Box::pin(conn_for_prompt.send_request("session/prompt", prompt_params));

        let mut full_text = String::new();
        let mut seen_titles: HashSet<String> = HashSet::new();

        let result = loop {
            tokio::select! {
                biased;
                _ = cancelled(&options) => {
                    let _ = conn.send_notification("session/cancel", json!({"sessionId": session_id})).await;
                    break Err(AgentClientError::Cancelled);
                }
                prompt_result = &mut prompt_call => {
                    break prompt_result.map(|_| ());
                }
                event = event_rx.recv() => {
                    match event {
                        Some(SessionEvent::MessageChunk(text)) => {
                            full_text.push_str(&text);
                            options.callbacks.emit_chunk(&text);
                        }
                        Some(SessionEvent::ThoughtChunk(text)) => {
                            options.callbacks.emit_thought(&text);
                        }
                        Some(SessionEvent::ToolEvent { name, status, detail, title }) => {
                            options.callbacks.emit_tool_event(&name, &status, &detail);
                            if let Some(title) = title {
                                if seen_titles.insert(title.clone()) {
                                    options.callbacks.emit_intent(&title);
                                }
                            }
                        }
                        Some(SessionEvent::PermissionRequest { rpc_id, request }) => {
                            let response = options.callbacks.resolve_permission(request).await;
                            let outcome = match response {
                                PermissionResponse::Selected(id) => {
                                    json!({"outcome": {"outcome": "selected", "optionId": id}})
                                }
                                PermissionResponse::Cancelled => json!({"outcome": {"outcome": "cancelled"}}),
                            };
                            let _ = conn.send_response(rpc_id, outcome).await;
                        }
                        None => break Err(AgentClientError::ProcessExited(
                            String::from_utf8_lossy(&conn.stderr_tail.lock()).to_string(),
                        )),
                    }
                }
            }
        };

        conn.sessions.remove(&session_id);
        result.map(|_| full_text)
    }
}

async fn cancelled(options: &RunOptions) {
    match &options.cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
#[path = "acp_tests.rs"]
mod tests;
