// SPDX-License-Identifier: MIT

//! A deterministic, in-memory [`AgentClient`] for engine tests (gated the
//! same way the teacher gates its `FakeAgentAdapter`: behind `test-support`
//! or `cfg(test)`).

use crate::client::{AgentClient, RunOptions};
use crate::error::AgentClientError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub prompt: String,
    pub native_session_id: Option<String>,
}

enum Scripted {
    Text(String),
    Error(String),
    /// Stream `chunk`, then wait for the run's cancellation token to fire
    /// before returning `Err(Cancelled)`.
    StreamThenWaitForCancel(String),
}

/// Programmable fake: enqueue responses with [`FakeAgentClient::push_response`]
/// or [`FakeAgentClient::push_error`]; each `run()` call pops one (or loops
/// the last one forever if the queue is exhausted).
pub struct FakeAgentClient {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    queue: Vec<Scripted>,
    calls: Vec<RecordedRun>,
    session_id_to_announce: Option<String>,
}

impl Default for FakeAgentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAgentClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                queue: Vec::new(),
                calls: Vec::new(),
                session_id_to_announce: None,
            })),
        }
    }

    pub fn push_response(&self, text: impl Into<String>) {
        self.inner.lock().queue.push(Scripted::Text(text.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.inner.lock().queue.push(Scripted::Error(message.into()));
    }

    /// Schedule a run that streams `chunk` then blocks on cancellation.
    pub fn push_stream_then_wait_for_cancel(&self, chunk: impl Into<String>) {
        self.inner
            .lock()
            .queue
            .push(Scripted::StreamThenWaitForCancel(chunk.into()));
    }

    /// Native session id this fake will report through `on_session_id`
    /// whenever a call starts a fresh conversation.
    pub fn set_announced_session_id(&self, id: impl Into<String>) {
        self.inner.lock().session_id_to_announce = Some(id.into());
    }

    pub fn calls(&self) -> Vec<RecordedRun> {
        self.inner.lock().calls.clone()
    }
}

impl Clone for FakeAgentClient {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl AgentClient for FakeAgentClient {
    async fn run(&self, options: RunOptions) -> Result<String, AgentClientError> {
        {
            let mut inner = self.inner.lock();
            inner.calls.push(RecordedRun {
                prompt: options.prompt.clone(),
                native_session_id: options.native_session_id.clone(),
            });
        }

        if options.native_session_id.is_none() {
            let announce = self.inner.lock().session_id_to_announce.clone();
            if let Some(id) = announce {
                options.callbacks.emit_session_id(&id);
            }
        }

        if options.is_cancelled() {
            return Err(AgentClientError::Cancelled);
        }

        let scripted = {
            let mut inner = self.inner.lock();
            if inner.queue.is_empty() {
                None
            } else if inner.queue.len() == 1 {
                Some(match &inner.queue[0] {
                    Scripted::Text(t) => Scripted::Text(t.clone()),
                    Scripted::Error(e) => Scripted::Error(e.clone()),
                    Scripted::StreamThenWaitForCancel(c) => {
                        Scripted::StreamThenWaitForCancel(c.clone())
                    }
                })
            } else {
                Some(inner.queue.remove(0))
            }
        };

        match scripted {
            Some(Scripted::Text(text)) => {
                options.callbacks.emit_chunk(&text);
                Ok(text)
            }
            Some(Scripted::Error(message)) => Err(AgentClientError::Protocol(message)),
            Some(Scripted::StreamThenWaitForCancel(chunk)) => {
                options.callbacks.emit_chunk(&chunk);
                match &options.cancel {
                    Some(token) => {
                        token.cancelled().await;
                        Err(AgentClientError::Cancelled)
                    }
                    None => Ok(chunk),
                }
            }
            None => {
                let text = String::new();
                options.callbacks.emit_chunk(&text);
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
