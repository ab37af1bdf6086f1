// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tenazas-daemon: `tenazasd`, the long-running background process that
//! owns the Heartbeat Scheduler's tick loop so skills can
//! run unattended without a UI surface in front of them.

pub mod agents;
pub mod env;

use std::sync::Arc;
use std::time::Duration;
use tenazas_adapters::AgentClientRegistry;
use tenazas_bus::EventBus;
use tenazas_core::{Clock, SystemClock};
use tenazas_engine::{load_heartbeat_defs, EngineError, HeartbeatScheduler, SkillEngine};
use tenazas_storage::{SessionStore, StorageRoot, TaskStore};
use tracing::{info, warn};

/// Everything one daemon process needs to tick every configured heartbeat.
/// Constructed once at startup and shared by every tick.
pub struct DaemonContext {
    storage: StorageRoot,
    scheduler: Arc<HeartbeatScheduler>,
}

impl DaemonContext {
    /// Assembles the full stack against the real process agents. Tests that
    /// don't need a real subprocess build a [`DaemonContext`] from
    /// [`DaemonContext::with_registry`] and a
    /// [`tenazas_adapters::FakeAgentClient`] instead.
    pub fn build(storage: StorageRoot) -> Self {
        Self::with_registry(storage, agents::build_registry())
    }

    pub fn with_registry(storage: StorageRoot, registry: AgentClientRegistry) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let bus = EventBus::new();
        let engine_sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
        let engine = Arc::new(SkillEngine::new(
            engine_sessions,
            registry,
            bus.clone(),
            Arc::clone(&clock),
        ));
        let sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
        let tasks = TaskStore::new(storage.clone(), Arc::clone(&clock));
        let scheduler = Arc::new(HeartbeatScheduler::new(
            storage.clone(),
            sessions,
            tasks,
            engine,
            bus,
            clock,
        ));
        Self { storage, scheduler }
    }

    /// One full pass over every heartbeat definition on disk: a definition that errors is logged and skipped rather than
    /// aborting the rest of the tick, since heartbeats are independent.
    pub async fn tick_once(&self) -> Result<(), EngineError> {
        let defs = load_heartbeat_defs(&self.storage)?;
        for def in &defs {
            if let Err(e) = self.scheduler.tick(def).await {
                warn!(heartbeat = %def.name, error = %e, "heartbeat tick failed");
            }
        }
        Ok(())
    }

    /// Ticks forever on `interval` until `shutdown` resolves.
    pub async fn run_forever(&self, interval: Duration, shutdown: impl std::future::Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick_once().await {
                        warn!(error = %e, "heartbeat pass failed");
                    }
                }
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping tick loop");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
