// SPDX-License-Identifier: MIT

//! Cross-process advisory locking via a sibling `.lock` file.

use crate::error::StorageError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// An exclusive advisory lock held on `<path>.lock` for the lifetime of this value.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until an exclusive lock on `<target>.lock` is acquired.
    pub fn acquire(target: &Path) -> Result<Self, StorageError> {
        let path = lock_path(target);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| StorageError::LockContention(format!("{}: {e}", path.display())))?;
        Ok(Self { _file: file, path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self._file);
        let _ = &self.path;
    }
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    name.push_str(".lock");
    target.with_file_name(name)
}

#[cfg(test)]
#[path = "lockfile_tests.rs"]
mod tests;
