// SPDX-License-Identifier: MIT

//! Agent Client Abstraction: the uniform streaming contract over the three
//! process transports an orchestrated skill can drive, plus the shell
//! command runner used for `pre_action_cmd`/`verify_cmd`.

mod acp;
mod cancel;
mod client;
mod error;
mod oneshot;
mod shell;
mod thought_parser;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use acp::AcpClient;
pub use cancel::CancellationToken;
pub use client::{
    auto_approve, AgentClient, AgentClientRegistry, ChunkCallback, IntentCallback,
    PermissionCallback, PermissionFuture, PermissionOption, PermissionOptionKind,
    PermissionRequest, PermissionResponse, RunCallbacks, RunOptions, SessionIdCallback,
    ThoughtCallback, ToolEventCallback,
};
pub use error::AgentClientError;
pub use oneshot::{OneShotAgentClient, OneShotSpec, AGENT_A, AGENT_B};
pub use shell::{run_shell, ShellResult, MAX_OUTPUT_BYTES, SHELL_TIMEOUT};
pub use thought_parser::{ThoughtChunk, ThoughtParser};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgentClient, RecordedRun};
