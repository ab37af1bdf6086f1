// SPDX-License-Identifier: MIT

//! Storage error taxonomy: contract violations are distinct
//! typed variants, never silently converted into a different one.

use tenazas_core::{InvalidTransition, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("global index corrupt: {0}")]
    IndexCorrupt(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("dependency cycle would form between {a} and {b}")]
    Cycle { a: TaskId, b: TaskId },
    #[error("self-dependency is not allowed: {0}")]
    SelfDependency(TaskId),
    #[error("lock contention on {0}")]
    LockContention(String),
    #[error("cannot archive: active task {active} is blocked_by archived task {archived}")]
    BlockedByArchived { active: TaskId, archived: TaskId },
}
