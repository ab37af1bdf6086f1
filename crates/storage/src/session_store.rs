// SPDX-License-Identifier: MIT

//! Session CRUD, audit append, and the global index.

use crate::atomic::write_atomic;
use crate::audit::{append_audit, tail_audit};
use crate::error::StorageError;
use crate::lockfile::FileLock;
use crate::paths::StorageRoot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tenazas_core::{AuditEntry, Clock, Session, SessionId};

/// A row of the rebuildable global index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: SessionId,
    pub cwd: PathBuf,
    pub title: String,
    pub last_updated: DateTime<Utc>,
    pub ephemeral: bool,
}

/// Slow-path rebuild scans at most this many session files.
pub const INDEX_REBUILD_CAP: usize = 500;

pub struct SessionStore {
    root: StorageRoot,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(root: StorageRoot, clock: Arc<dyn Clock>) -> Self {
        Self { root, clock }
    }

    pub fn create(&self, workspace: PathBuf) -> Result<Session, StorageError> {
        let id = SessionId::new(tenazas_core::new_uuid());
        let session = Session::new(id.clone(), workspace.clone(), self.clock.now());
        self.save(&session)?;
        write_atomic(
            &self.root.session_index_pointer_path(id.as_str()),
            workspace.to_string_lossy().as_bytes(),
        )?;
        self.upsert_index_entry(&session)?;
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        session
            .check_invariants()
            .map_err(StorageError::IndexCorrupt)?;
        let path = self
            .root
            .session_meta_path(&session.workspace, session.id.as_str());
        write_atomic(&path, serde_json::to_string_pretty(session)?.as_bytes())?;
        if !session.archived {
            self.upsert_index_entry(session)?;
        }
        Ok(())
    }

    /// Resolve a session's workspace via the per-id pointer file, then load
    /// its meta record from `<workspace-slug>/<id>.meta.json`.
    pub fn load(&self, id: &SessionId) -> Result<Session, StorageError> {
        let pointer = self.root.session_index_pointer_path(id.as_str());
        let workspace = std::fs::read_to_string(&pointer)
            .map_err(|_| StorageError::SessionNotFound(id.to_string()))?;
        let workspace = PathBuf::from(workspace);
        let meta_path = self.root.session_meta_path(&workspace, id.as_str());
        let bytes = std::fs::read(&meta_path)
            .map_err(|_| StorageError::SessionNotFound(id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Move the session's meta file to the `.meta.json.archive` sibling and
    /// drop it from the active global index.
    pub fn archive(&self, session: &mut Session) -> Result<(), StorageError> {
        session.archived = true;
        session.updated_at = self.clock.now();
        let active_path = self
            .root
            .session_meta_path(&session.workspace, session.id.as_str());
        let archive_path = self
            .root
            .session_archive_path(&session.workspace, session.id.as_str());
        write_atomic(&archive_path, serde_json::to_string_pretty(session)?.as_bytes())?;
        if active_path.exists() {
            std::fs::remove_file(&active_path)?;
        }
        self.remove_index_entry(&session.id)
    }

    pub fn append_audit(&self, session: &Session, entry: &AuditEntry) -> Result<(), StorageError> {
        let path = self
            .root
            .session_audit_path(&session.workspace, session.id.as_str());
        append_audit(&path, entry)
    }

    pub fn tail_audit(&self, session: &Session, n: usize) -> Result<Vec<AuditEntry>, StorageError> {
        let path = self
            .root
            .session_audit_path(&session.workspace, session.id.as_str());
        tail_audit(&path, n)
    }

    /// List active (non-archived) sessions from the global index, rebuilding
    /// it from the per-workspace files if missing or corrupt.
    pub fn list_active(&self) -> Result<Vec<IndexEntry>, StorageError> {
        let path = self.root.global_index_path();
        match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<IndexEntry>>(&bytes) {
                Ok(entries) => Ok(entries),
                Err(_) => self.rebuild_index(),
            },
            Err(_) => self.rebuild_index(),
        }
    }

    /// Scan `sessions/<slug>/*.meta.json` (excluding `.archive` siblings)
    /// across all workspace directories, capped at [`INDEX_REBUILD_CAP`].
    pub fn rebuild_index(&self) -> Result<Vec<IndexEntry>, StorageError> {
        let mut entries = Vec::new();
        let sessions_dir = self.root.sessions_dir();
        let Ok(workspace_dirs) = std::fs::read_dir(&sessions_dir) else {
            write_atomic(&self.root.global_index_path(), b"[]")?;
            return Ok(entries);
        };
        'outer: for workspace_dir in workspace_dirs.flatten() {
            if !workspace_dir.path().is_dir() {
                continue;
            }
            let Ok(files) = std::fs::read_dir(workspace_dir.path()) else {
                continue;
            };
            for file in files.flatten() {
                let file_path = file.path();
                let name = file_path.to_string_lossy();
                if !name.ends_with(".meta.json") {
                    continue;
                }
                if let Ok(bytes) = std::fs::read(&file_path) {
                    if let Ok(session) = serde_json::from_slice::<Session>(&bytes) {
                        if !session.archived {
                            entries.push(IndexEntry {
                                id: session.id,
                                cwd: session.workspace,
                                title: session.title,
                                last_updated: session.updated_at,
                                ephemeral: session.ephemeral,
                            });
                        }
                    }
                }
                if entries.len() >= INDEX_REBUILD_CAP {
                    break 'outer;
                }
            }
        }
        write_atomic(&self.root.global_index_path(), serde_json::to_string(&entries)?.as_bytes())?;
        Ok(entries)
    }

    fn upsert_index_entry(&self, session: &Session) -> Result<(), StorageError> {
        let _lock = FileLock::acquire(&self.root.global_index_path())?;
        let mut entries = self.read_index_unlocked()?;
        entries.retain(|e| e.id != session.id);
        entries.push(IndexEntry {
            id: session.id.clone(),
            cwd: session.workspace.clone(),
            title: session.title.clone(),
            last_updated: session.updated_at,
            ephemeral: session.ephemeral,
        });
        write_atomic(&self.root.global_index_path(), serde_json::to_string(&entries)?.as_bytes())
    }

    fn remove_index_entry(&self, id: &SessionId) -> Result<(), StorageError> {
        let _lock = FileLock::acquire(&self.root.global_index_path())?;
        let mut entries = self.read_index_unlocked()?;
        entries.retain(|e| &e.id != id);
        write_atomic(&self.root.global_index_path(), serde_json::to_string(&entries)?.as_bytes())
    }

    fn read_index_unlocked(&self) -> Result<Vec<IndexEntry>, StorageError> {
        let path = self.root.global_index_path();
        match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => {
                Ok(serde_json::from_slice(&bytes).unwrap_or_default())
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
