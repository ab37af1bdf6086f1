// SPDX-License-Identifier: MIT

//! Task identifier and status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `TSK-` followed by a 6-digit zero-padded integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("TSK-{:06}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

/// Validate a status transition against the table in spec.md §4.5.
///
/// ```text
/// todo        -> in-progress | blocked | done
/// in-progress -> done | blocked | todo
/// blocked     -> todo | in-progress
/// done        -> todo                       (reopen only)
/// ```
/// Any other transition, including self-transitions, is rejected.
pub fn validate_transition(from: TaskStatus, to: TaskStatus) -> Result<(), InvalidTransition> {
    use TaskStatus::*;
    let allowed = matches!(
        (from, to),
        (Todo, InProgress) | (Todo, Blocked) | (Todo, Done)
            | (InProgress, Done) | (InProgress, Blocked) | (InProgress, Todo)
            | (Blocked, Todo) | (Blocked, InProgress)
            | (Done, Todo)
    );
    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

/// Owner triple set while a task is in-progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub pid: u32,
    pub instance_id: String,
    pub session_id: Option<String>,
}

/// A task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    /// Non-negative; higher first.
    pub priority: u32,
    pub failure_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub owner: Option<Owner>,
    pub blocks: Vec<TaskId>,
    pub blocked_by: Vec<TaskId>,
    pub skill: Option<String>,
    pub labels: Vec<String>,
    pub content: String,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            status: TaskStatus::Todo,
            priority: 0,
            failure_count: 0,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            owner: None,
            blocks: Vec::new(),
            blocked_by: Vec::new(),
            skill: None,
            labels: Vec::new(),
            content: String::new(),
        }
    }

    /// Apply a validated transition in place, handling the owner-triple and
    /// timestamp side effects spec.md §4.5 describes.
    pub fn apply_transition(
        &mut self,
        to: TaskStatus,
        now: DateTime<Utc>,
        owner: Option<Owner>,
    ) -> Result<(), InvalidTransition> {
        validate_transition(self.status, to)?;
        let leaving_in_progress = self.status == TaskStatus::InProgress && to != TaskStatus::InProgress;
        let entering_in_progress = to == TaskStatus::InProgress;

        self.status = to;
        self.updated_at = now;

        if entering_in_progress {
            if self.started_at.is_none() {
                self.started_at = Some(now);
            }
            self.owner = owner;
        }
        if leaving_in_progress {
            self.owner = None;
        }
        if to == TaskStatus::Done {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Clear owner, failure_count, started_at and completed_at in one step.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.owner = None;
        self.failure_count = 0;
        self.started_at = None;
        self.completed_at = None;
        self.updated_at = now;
    }

    pub fn is_ready(&self, done: impl Fn(&TaskId) -> bool) -> bool {
        self.status == TaskStatus::Todo && self.blocked_by.iter().all(|d| done(d))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
