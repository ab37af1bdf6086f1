// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tenazas-core: domain types shared across the orchestration kernel.

#[macro_use]
pub mod id;
pub mod clock;
pub mod event;
pub mod heartbeat;
pub mod registry;
pub mod session;
pub mod skill;
pub mod task;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{AuditEntry, AuditKind, BusEvent, TaskStatusPayload};
pub use heartbeat::HeartbeatDef;
pub use id::new_uuid;
pub use registry::{InstanceState, PendingAction, Verbosity};
pub use session::{ApprovalMode, ChatAnchor, ModelTier, Session, SessionId, SessionStatus};
pub use skill::{SkillGraph, StateDef, StateType};
pub use task::{InvalidTransition, Owner, Task, TaskId, TaskStatus, validate_transition};

/// Resume sentinel text.
pub const RESUME_SENTINEL: &str = "Session resumed. Please continue from where you left off.";
