// SPDX-License-Identifier: MIT

//! Variant A of the Agent Client: the one-shot JSON-lines subprocess. Each
//! `run()` spawns a fresh process, decodes newline-delimited JSON
//! `{type, session_id, content}` from stdout, and dispatches on `type`. The
//! two concrete one-shot agents share this machinery but differ in flag
//! vocabulary and `type` tag names; that difference is captured in
//! [`OneShotSpec`].
//!
//! The exact `type` tag strings aren't pinned down beyond "a different type
//! vocabulary" for the second agent — each concrete [`OneShotSpec`] constant
//! below fixes one, consistent internally with its own flag contract.

use crate::client::{AgentClient, RunOptions};
use crate::error::AgentClientError;
use crate::thought_parser::ThoughtParser;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tenazas_core::{ApprovalMode, ModelTier};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Cap on a single decoded stdout line, matching the capacity discipline a
/// line-oriented log scanner applies, here to JSON framing instead of
/// terminal output.
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct LineEvent {
    #[serde(rename = "type")]
    kind: String,
    session_id: Option<String>,
    content: Option<String>,
}

/// Flag and type-tag vocabulary for one concrete one-shot agent.
pub struct OneShotSpec {
    pub binary: &'static str,
    pub fixed_args: &'static [&'static str],
    pub prompt_flag: &'static str,
    pub resume_flag: &'static str,
    pub yolo_flag: &'static str,
    pub approval_flag: Option<&'static str>,
    pub permission_flag: Option<&'static str>,
    pub budget_flag: Option<&'static str>,
    pub session_tag: &'static str,
    pub chunk_tag: &'static str,
    pub thought_tag: &'static str,
}

/// Flag contract for the first one-shot agent: `-s --output-format
/// stream-json --prompt <text>` plus `--resume`, `-y`, `--approval-mode`,
/// `--model`.
pub const AGENT_A: OneShotSpec = OneShotSpec {
    binary: "agent-a",
    fixed_args: &["-s", "--output-format", "stream-json"],
    prompt_flag: "--prompt",
    resume_flag: "--resume",
    yolo_flag: "-y",
    approval_flag: Some("--approval-mode"),
    permission_flag: None,
    budget_flag: None,
    session_tag: "system",
    chunk_tag: "assistant",
    thought_tag: "thinking",
};

/// Flag contract for the second one-shot agent: `--output-format
/// stream-json -p <text>` plus `--continue`, `--dangerously-skip-permissions`,
/// `--permission-mode`, `--model`, `--max-budget-usd`.
pub const AGENT_B: OneShotSpec = OneShotSpec {
    binary: "agent-b",
    fixed_args: &["--output-format", "stream-json"],
    prompt_flag: "-p",
    resume_flag: "--continue",
    yolo_flag: "--dangerously-skip-permissions",
    approval_flag: None,
    permission_flag: Some("--permission-mode"),
    budget_flag: Some("--max-budget-usd"),
    session_tag: "init",
    chunk_tag: "message",
    thought_tag: "reasoning",
};

fn model_tier_str(tier: ModelTier) -> &'static str {
    match tier {
        ModelTier::High => "high",
        ModelTier::Medium => "medium",
        ModelTier::Low => "low",
        ModelTier::Unset => "default",
    }
}

fn approval_mode_str(mode: ApprovalMode) -> &'static str {
    match mode {
        ApprovalMode::Plan => "plan",
        ApprovalMode::AutoEdit => "auto_edit",
        ApprovalMode::Yolo => "yolo",
    }
}

fn build_args(spec: &OneShotSpec, options: &RunOptions) -> Vec<String> {
    let mut args: Vec<String> = spec.fixed_args.iter().map(|a| a.to_string()).collect();
    args.push(spec.prompt_flag.to_string());
    args.push(options.prompt.clone());

    if let Some(native) = &options.native_session_id {
        args.push(spec.resume_flag.to_string());
        args.push(native.clone());
    }
    if options.yolo {
        args.push(spec.yolo_flag.to_string());
    }
    if let Some(flag) = spec.approval_flag {
        args.push(flag.to_string());
        args.push(approval_mode_str(options.approval_mode).to_string());
    }
    if let Some(flag) = spec.permission_flag {
        args.push(flag.to_string());
        args.push(approval_mode_str(options.approval_mode).to_string());
    }
    args.push("--model".to_string());
    args.push(model_tier_str(options.model_tier).to_string());
    if let (Some(flag), Some(budget)) = (spec.budget_flag, options.budget_usd) {
        args.push(flag.to_string());
        args.push(format!("{budget:.2}"));
    }
    args
}

pub struct OneShotAgentClient {
    spec: OneShotSpec,
}

impl OneShotAgentClient {
    pub const fn new(spec: OneShotSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl AgentClient for OneShotAgentClient {
    async fn run(&self, options: RunOptions) -> Result<String, AgentClientError> {
        let args = build_args(&self.spec, &options);
        let mut command = Command::new(self.spec.binary);
        command
            .args(&args)
            .current_dir(&options.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| AgentClientError::Spawn(e.to_string()))?;
        let stdout = child.stdout.take().expect("stdout was piped");
        let mut reader = BufReader::new(stdout);

        let mut full_text = String::new();
        let mut parser = ThoughtParser::new();
        let mut announced_session = options.native_session_id.is_some();

        loop {
            if options.is_cancelled() {
                let _ = child.start_kill();
                return Err(AgentClientError::Cancelled);
            }

            let mut line = Vec::new();
            let read_fut = reader.read_until(b'\n', &mut line);
            let n = tokio::select! {
                biased;
                _ = cancelled_or_pending(&options) => {
                    let _ = child.start_kill();
                    return Err(AgentClientError::Cancelled);
                }
                result = read_fut => result.map_err(AgentClientError::Io)?,
            };
            if n == 0 {
                break; // EOF
            }
            if line.len() > MAX_LINE_BYTES {
                return Err(AgentClientError::Protocol(
                    "agent stdout line exceeded capacity".to_string(),
                ));
            }
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            let Ok(event) = serde_json::from_str::<LineEvent>(trimmed) else {
                continue;
            };

            if event.kind == self.spec.session_tag {
                if !announced_session {
                    if let Some(id) = &event.session_id {
                        options.callbacks.emit_session_id(id);
                        announced_session = true;
                    }
                }
            } else if event.kind == self.spec.chunk_tag {
                if let Some(content) = &event.content {
                    let parsed = parser.push(content);
                    if !parsed.visible.is_empty() {
                        full_text.push_str(&parsed.visible);
                        options.callbacks.emit_chunk(&parsed.visible);
                    }
                    if !parsed.thought.is_empty() {
                        options.callbacks.emit_thought(&parsed.thought);
                    }
                }
            } else if event.kind == self.spec.thought_tag {
                if let Some(content) = &event.content {
                    options.callbacks.emit_thought(content);
                }
            }
        }

        let flushed = parser.finish();
        if !flushed.visible.is_empty() {
            full_text.push_str(&flushed.visible);
            options.callbacks.emit_chunk(&flushed.visible);
        }
        if !flushed.thought.is_empty() {
            options.callbacks.emit_thought(&flushed.thought);
        }

        let status = child.wait().await.map_err(AgentClientError::Io)?;
        if !status.success() {
            if let Some(mut stderr) = child.stderr.take() {
                let mut buf = Vec::new();
                use tokio::io::AsyncReadExt;
                let _ = stderr.read_to_end(&mut buf).await;
                if !buf.is_empty() {
                    return Err(AgentClientError::ProcessExited(
                        String::from_utf8_lossy(&buf).to_string(),
                    ));
                }
            }
            return Err(AgentClientError::ProcessExited(format!(
                "exit status {status}"
            )));
        }

        Ok(full_text)
    }
}

async fn cancelled_or_pending(options: &RunOptions) {
    match &options.cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
#[path = "oneshot_tests.rs"]
mod tests;
