// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon crate.

use std::time::Duration;

/// Default spacing between heartbeat ticks when `TENAZAS_HEARTBEAT_INTERVAL_MS`
/// is unset. This is a daemon-local operational knob, not one of the
/// kernel's own configured overrides.
const DEFAULT_TICK_INTERVAL_MS: u64 = 5_000;

pub fn tick_interval() -> Duration {
    std::env::var("TENAZAS_HEARTBEAT_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
}
