// SPDX-License-Identifier: MIT

//! Engine error taxonomy: storage/agent failures that are not
//! handled inline as retry feedback bubble up here as contract violations
//! or fatal errors.

use tenazas_adapters::AgentClientError;
use tenazas_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("agent client error: {0}")]
    Agent(#[from] AgentClientError),
    #[error("state {0:?} not found")]
    StateNotFound(String),
    #[error("skill {0:?} not found")]
    SkillNotFound(String),
    #[error("heartbeat {0:?} not found")]
    HeartbeatNotFound(String),
}
