// SPDX-License-Identifier: MIT

//! Assembles the storage/bus/engine stack each one-shot CLI invocation
//! needs.

use std::sync::Arc;
use tenazas_adapters::{AcpClient, AgentClient, AgentClientRegistry, OneShotAgentClient, AGENT_A, AGENT_B};
use tenazas_bus::EventBus;
use tenazas_core::{Clock, SystemClock};
use tenazas_engine::SkillEngine;
use tenazas_storage::{SessionStore, StorageRoot, TaskStore};

/// The registry key a session with no explicit `active_agent` resolves to.
pub const DEFAULT_AGENT_KEY: &str = "default";

fn build_registry() -> AgentClientRegistry {
    let mut registry = AgentClientRegistry::new();
    let agent_a: Arc<dyn AgentClient> = Arc::new(OneShotAgentClient::new(AGENT_A));
    registry.register("agent-a", Arc::clone(&agent_a));
    registry.register(DEFAULT_AGENT_KEY, agent_a);
    let agent_b: Arc<dyn AgentClient> = Arc::new(OneShotAgentClient::new(AGENT_B));
    registry.register("agent-b", agent_b);
    let acp: Arc<dyn AgentClient> = Arc::new(AcpClient::new("acp-agent"));
    registry.register("acp", acp);
    registry
}

pub struct CliContext {
    pub storage: StorageRoot,
    pub clock: Arc<dyn Clock>,
    pub sessions: SessionStore,
    pub tasks: TaskStore,
    pub bus: EventBus,
    pub engine: Arc<SkillEngine>,
}

impl CliContext {
    pub fn build(storage: StorageRoot) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let bus = EventBus::new();
        let engine_sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
        let engine = Arc::new(SkillEngine::new(
            engine_sessions,
            build_registry(),
            bus.clone(),
            Arc::clone(&clock),
        ));
        let sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
        let tasks = TaskStore::new(storage.clone(), Arc::clone(&clock));
        Self {
            storage,
            clock,
            sessions,
            tasks,
            bus,
            engine,
        }
    }
}
