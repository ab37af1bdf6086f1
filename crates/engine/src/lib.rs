// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tenazas-engine: the Skill Engine run loop and the
//! Heartbeat Scheduler that drives it unattended.

mod cancel_registry;
mod engine;
mod env;
mod error;
mod heartbeat;
mod heartbeat_loader;
mod intervention;
mod prompt;
mod skill_loader;

pub use cancel_registry::CancelRegistry;
pub use engine::SkillEngine;
pub use error::EngineError;
pub use heartbeat::HeartbeatScheduler;
pub use heartbeat_loader::{load_heartbeat_def, load_heartbeat_defs};
pub use intervention::{InterventionDecision, InterventionRegistry};
pub use prompt::{build_prompt, render_fail_feedback, resolve_instruction};
pub use skill_loader::load_skill;
