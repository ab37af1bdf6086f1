// SPDX-License-Identifier: MIT

//! Skill graph definitions.

use crate::session::{ApprovalMode, ModelTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Discriminated state type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    End,
    Tool,
    ActionLoop,
}

/// A single node in a [`SkillGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDef {
    #[serde(rename = "type")]
    pub state_type: StateType,
    /// Role name used to key the Role Cache; empty means the "default" role.
    #[serde(default)]
    pub session_role: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub on_fail_route: Option<String>,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub approval_mode: Option<ApprovalMode>,
    #[serde(default)]
    pub model_tier: Option<ModelTier>,

    /// `tool` states only.
    #[serde(default)]
    pub command: Option<String>,

    /// `action_loop` states only.
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub pre_action_cmd: Option<String>,
    #[serde(default)]
    pub verify_cmd: Option<String>,
    #[serde(default)]
    pub post_action_cmd: Option<String>,
    #[serde(default)]
    pub on_fail_prompt: Option<String>,
}

impl StateDef {
    pub fn role(&self) -> &str {
        self.session_role.as_deref().unwrap_or("default")
    }
}

/// A named, loaded skill state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGraph {
    pub name: String,
    /// Base directory for @-prefixed asset resolution.
    pub base_dir: PathBuf,
    pub initial_state: String,
    #[serde(default)]
    pub max_loops: Option<u32>,
    #[serde(default)]
    pub max_budget_usd: Option<f64>,
    pub states: HashMap<String, StateDef>,
}

impl SkillGraph {
    pub fn state(&self, name: &str) -> Option<&StateDef> {
        self.states.get(name)
    }

    /// Union of every `session_role` declared across this skill's states.
    pub fn declared_roles(&self) -> std::collections::HashSet<String> {
        self.states
            .values()
            .map(|s| s.role().to_string())
            .collect()
    }
}

#[cfg(test)]
#[path = "skill_tests.rs"]
mod tests;
