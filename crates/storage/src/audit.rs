// SPDX-License-Identifier: MIT

//! Per-session append-only audit log.

use crate::error::StorageError;
use crate::lockfile::FileLock;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tenazas_core::AuditEntry;

/// Append one line to the session's audit log, under the sibling `.lock`.
///
/// A single process-wide exclusive file lock is held across the append, so
/// concurrent appenders (multiple UI surfaces, heartbeat, engine) serialize.
pub fn append_audit(path: &Path, entry: &AuditEntry) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _lock = FileLock::acquire(path)?;
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');
    f.write_all(line.as_bytes())?;
    Ok(())
}

const CHUNK_SIZE: usize = 4096;

/// Return the last `min(n, |audit|)` entries, oldest→newest.
///
/// Seeks backward in 4 KiB chunks from end-of-file, stitching partial lines
/// across chunk boundaries, stopping once `n` complete lines are collected.
pub fn tail_audit(path: &Path, n: usize) -> Result<Vec<AuditEntry>, StorageError> {
    if n == 0 || !path.exists() {
        return Ok(Vec::new());
    }
    let mut f = std::fs::File::open(path)?;
    let file_len = f.metadata()?.len();

    let mut collected_lines: Vec<String> = Vec::new();
    let mut trailing_partial = Vec::new();
    let mut pos = file_len;

    while pos > 0 && collected_lines.len() < n {
        let read_size = CHUNK_SIZE.min(pos as usize);
        pos -= read_size as u64;
        f.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; read_size];
        f.read_exact(&mut buf)?;
        buf.extend_from_slice(&trailing_partial);

        let mut lines: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
        // The first element may be a partial line continuing into the previous
        // (earlier) chunk; carry it forward unless we're at the start of file.
        trailing_partial = if pos > 0 {
            lines.remove(0).to_vec()
        } else {
            Vec::new()
        };

        let mut chunk_lines: Vec<String> = lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .map(|l| String::from_utf8_lossy(l).to_string())
            .collect();
        chunk_lines.extend(collected_lines);
        collected_lines = chunk_lines;
    }

    let start = collected_lines.len().saturating_sub(n);
    collected_lines[start..]
        .iter()
        .map(|line| serde_json::from_str(line).map_err(StorageError::from))
        .collect()
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
