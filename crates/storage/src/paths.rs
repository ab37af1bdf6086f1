// SPDX-License-Identifier: MIT

//! Path resolution and workspace slugging.

use std::path::{Path, PathBuf};

/// Root of the `<storage>` tree described in spec.md §6.
///
/// Resolved from `TENAZAS_STORAGE_DIR` when set; otherwise falls back to a
/// per-user data directory. The fallback is an **(added)** default — the
/// spec's own deployment always sets the env var (§6), but a standalone
/// crate needs *some* default when it's unset.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    base: PathBuf,
}

impl StorageRoot {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve from `TENAZAS_STORAGE_DIR`, falling back to `dirs::data_dir()/tenazas`.
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var("TENAZAS_STORAGE_DIR") {
            return Self::new(dir);
        }
        let base = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("tenazas");
        Self::new(base)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.base.join("sessions")
    }

    pub fn session_workspace_dir(&self, workspace: &Path) -> PathBuf {
        self.sessions_dir().join(slugify(workspace))
    }

    pub fn session_meta_path(&self, workspace: &Path, session_id: &str) -> PathBuf {
        self.session_workspace_dir(workspace)
            .join(format!("{session_id}.meta.json"))
    }

    pub fn session_archive_path(&self, workspace: &Path, session_id: &str) -> PathBuf {
        self.session_workspace_dir(workspace)
            .join(format!("{session_id}.meta.json.archive"))
    }

    pub fn session_audit_path(&self, workspace: &Path, session_id: &str) -> PathBuf {
        self.session_workspace_dir(workspace)
            .join(format!("{session_id}.audit.jsonl"))
    }

    pub fn global_index_path(&self) -> PathBuf {
        self.sessions_dir().join(".global_index.json")
    }

    pub fn session_index_pointer_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(".index").join(session_id)
    }

    pub fn tasks_dir(&self, workspace: &Path) -> PathBuf {
        self.base.join("tasks").join(slugify(workspace))
    }

    pub fn task_path(&self, workspace: &Path, task_id: &str) -> PathBuf {
        self.tasks_dir(workspace).join(format!("{task_id}.md"))
    }

    pub fn task_sequence_path(&self, workspace: &Path) -> PathBuf {
        self.tasks_dir(workspace).join(".task_sequence")
    }

    pub fn task_archive_dir(&self, workspace: &Path, rfc3339_ts: &str) -> PathBuf {
        self.tasks_dir(workspace).join("archive").join(rfc3339_ts)
    }

    pub fn skill_dir(&self, name: &str) -> PathBuf {
        self.base.join("skills").join(name)
    }

    pub fn skill_def_path(&self, name: &str) -> PathBuf {
        self.skill_dir(name).join("skill.json")
    }

    pub fn heartbeats_dir(&self) -> PathBuf {
        self.base.join("heartbeats")
    }

    pub fn heartbeat_def_path(&self, name: &str) -> PathBuf {
        self.heartbeats_dir().join(format!("{name}.json"))
    }

    pub fn registry_path(&self) -> PathBuf {
        self.base.join("registry.json")
    }

    pub fn skills_registry_path(&self) -> PathBuf {
        self.base.join("skills_registry.json")
    }
}

/// Turn an absolute workspace path into a filesystem-safe slug.
///
/// Every non alphanumeric byte becomes `-`; runs of `-` collapse to one.
pub fn slugify(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut slug = String::with_capacity(raw.len());
    let mut last_was_dash = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
