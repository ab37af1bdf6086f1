// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the CLI crate.

/// This process's instance id, in the `"cli-<pid>"` shape used as an
/// example Registry key, used as the owner triple's `instance_id` when a
/// CLI invocation claims a task.
pub fn instance_id() -> String {
    format!("cli-{}", std::process::id())
}
