// SPDX-License-Identifier: MIT

//! Adapter error taxonomy: agent-call failures are transient
//! and handled by the engine as feedback; an unknown agent name is a
//! contract violation surfaced to the caller untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentClientError {
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    #[error("failed to spawn agent process: {0}")]
    Spawn(String),
    #[error("agent protocol error: {0}")]
    Protocol(String),
    #[error("agent process exited: {0}")]
    ProcessExited(String),
    #[error("i/o error communicating with agent: {0}")]
    Io(#[from] std::io::Error),
    #[error("cancelled")]
    Cancelled,
}
