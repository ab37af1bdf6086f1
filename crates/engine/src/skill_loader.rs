// SPDX-License-Identifier: MIT

//! Loads a named `SkillGraph` from `<storage>/skills/<name>/skill.json`.
//! `base_dir` is filled in with the skill's own directory so `@`-prefixed
//! instructions resolve relative to it.

use crate::error::EngineError;
use tenazas_core::SkillGraph;
use tenazas_storage::StorageRoot;

pub fn load_skill(storage: &StorageRoot, name: &str) -> Result<SkillGraph, EngineError> {
    let path = storage.skill_def_path(name);
    let bytes = std::fs::read(&path).map_err(|_| EngineError::SkillNotFound(name.to_string()))?;
    let mut skill: SkillGraph =
        serde_json::from_slice(&bytes).map_err(tenazas_storage::StorageError::Serde)?;
    skill.base_dir = storage.skill_dir(name);
    Ok(skill)
}

#[cfg(test)]
#[path = "skill_loader_tests.rs"]
mod tests;
