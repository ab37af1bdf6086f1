//! Black-box specs for the `tenazas` CLI: each submodule drives the real
//! binary against a scratch storage root and workspace, exactly as a user
//! would from a shell.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/skill_run.rs"]
mod skill_run;

#[path = "specs/task_lifecycle.rs"]
mod task_lifecycle;

#[path = "specs/session.rs"]
mod session;

#[path = "specs/heartbeat.rs"]
mod heartbeat;
