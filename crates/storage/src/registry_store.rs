// SPDX-License-Identifier: MIT

//! Registry: per-instance ephemeral focus state, synchronized across
//! processes via the same advisory-lock discipline as the global session
//! index "Registry" operations).

use crate::atomic::write_atomic;
use crate::error::StorageError;
use crate::lockfile::FileLock;
use crate::paths::StorageRoot;
use std::collections::HashMap;
use tenazas_core::{InstanceState, PendingAction, SessionId, Verbosity};

pub struct RegistryStore {
    root: StorageRoot,
}

impl RegistryStore {
    pub fn new(root: StorageRoot) -> Self {
        Self { root }
    }

    pub fn get_instance(&self, instance_id: &str) -> Result<InstanceState, StorageError> {
        let all = self.load_unlocked()?;
        Ok(all.get(instance_id).cloned().unwrap_or_default())
    }

    pub fn set_focus(&self, instance_id: &str, session: Option<SessionId>) -> Result<(), StorageError> {
        self.mutate(instance_id, |row| row.focused_session = session)
    }

    pub fn set_verbosity(&self, instance_id: &str, verbosity: Verbosity) -> Result<(), StorageError> {
        self.mutate(instance_id, |row| row.verbosity = verbosity)
    }

    pub fn set_pending_action(&self, instance_id: &str, action: PendingAction) -> Result<(), StorageError> {
        self.mutate(instance_id, |row| row.pending_action = Some(action))
    }

    pub fn clear_pending_action(&self, instance_id: &str) -> Result<(), StorageError> {
        self.mutate(instance_id, |row| row.pending_action = None)
    }

    fn mutate(
        &self,
        instance_id: &str,
        f: impl FnOnce(&mut InstanceState),
    ) -> Result<(), StorageError> {
        let path = self.root.registry_path();
        let _lock = FileLock::acquire(&path)?;
        let mut all = self.load_unlocked()?;
        let row = all.entry(instance_id.to_string()).or_default();
        f(row);
        write_atomic(&path, serde_json::to_string(&all)?.as_bytes())
    }

    fn load_unlocked(&self) -> Result<HashMap<String, InstanceState>, StorageError> {
        let path = self.root.registry_path();
        match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => Ok(serde_json::from_slice(&bytes)?),
            _ => Ok(HashMap::new()),
        }
    }
}

#[cfg(test)]
#[path = "registry_store_tests.rs"]
mod tests;
