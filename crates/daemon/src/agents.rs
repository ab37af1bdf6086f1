// SPDX-License-Identifier: MIT

//! Builds the process-wide [`AgentClientRegistry`]: the two one-shot transports plus the long-lived ACP
//! peer, each under the name a [`Session::active_agent`] selects by.

use std::sync::Arc;
use tenazas_adapters::{
    AcpClient, AgentClient, AgentClientRegistry, OneShotAgentClient, AGENT_A, AGENT_B,
};

/// The registry key a session with no explicit `active_agent` resolves
/// to. The first one-shot agent
/// is the least surprising default: it needs no standing subprocess.
pub const DEFAULT_AGENT_KEY: &str = "default";

pub fn build_registry() -> AgentClientRegistry {
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
