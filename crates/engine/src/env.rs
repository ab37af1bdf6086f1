// SPDX-License-Identifier: MIT

//! Environment overrides consulted directly by the engine at construction
//! time.

/// Per-skill `max_loops` falls back to this when the skill graph doesn't
/// override it; `TENAZAS_MAX_LOOPS` overrides the built-in default.
pub fn default_max_loops() -> u32 {
    std::env::var("TENAZAS_MAX_LOOPS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
