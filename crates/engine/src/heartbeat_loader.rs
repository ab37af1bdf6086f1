// SPDX-License-Identifier: MIT

//! Loads `HeartbeatDef`s from `<storage>/heartbeats/*.json`, one definition per file, as the daemon's tick loop needs
//! the full set rather than a single named lookup.

use crate::error::EngineError;
use tenazas_core::HeartbeatDef;
use tenazas_storage::StorageRoot;

/// Reads a single named heartbeat definition, for callers
/// (the CLI's `heartbeat tick <name>`) that want one tick rather than a
/// full pass.
pub fn load_heartbeat_def(storage: &StorageRoot, name: &str) -> Result<HeartbeatDef, EngineError> {
    let path = storage.heartbeat_def_path(name);
    let bytes = std::fs::read(&path).map_err(|_| EngineError::HeartbeatNotFound(name.to_string()))?;
    let def: HeartbeatDef =
        serde_json::from_slice(&bytes).map_err(tenazas_storage::StorageError::Serde)?;
    Ok(def)
}

/// Reads every `*.json` file directly under the heartbeats directory.
/// A missing directory yields an empty list rather than an error: a fresh
/// storage root with no heartbeats configured is a normal starting state.
pub fn load_heartbeat_defs(storage: &StorageRoot) -> Result<Vec<HeartbeatDef>, EngineError> {
    let dir = storage.heartbeats_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(tenazas_storage::StorageError::Io(e).into()),
    };

    let mut defs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(tenazas_storage::StorageError::Io)?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let bytes = std::fs::read(&path).map_err(tenazas_storage::StorageError::Io)?;
        let def: HeartbeatDef =
            serde_json::from_slice(&bytes).map_err(tenazas_storage::StorageError::Serde)?;
        defs.push(def);
    }
    defs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(defs)
}

#[cfg(test)]
#[path = "heartbeat_loader_tests.rs"]
mod tests;
