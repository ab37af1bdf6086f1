// SPDX-License-Identifier: MIT

//! Shell Runner: `bash -c <cmd>` under a fixed deadline, output capped and
//! truncated. Failure is encoded as exit code + output, never
//! as a raised error — the engine treats
//! the result as a domain signal, not an exception.

use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

pub const SHELL_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_OUTPUT_BYTES: usize = 32 * 1024;
const TRUNCATION_MARKER: &str = "...[TRUNCATED]...";
const TRUNCATION_HEAD_BYTES: usize = 1000;
const TIMEOUT_MARKER: &str = "Command timed out after 30s";
const TIMEOUT_EXIT_CODE: i32 = 124;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResult {
    pub exit_code: i32,
    pub output: String,
}

/// Run `cmd` through `bash -c` in `workspace`, under [`SHELL_TIMEOUT`].
pub async fn run_shell(workspace: &Path, cmd: &str) -> ShellResult {
    let mut command = Command::new("bash");
    command
        .arg("-c")
        .arg(cmd)
        .current_dir(workspace)
        .kill_on_drop(true);

    match tokio::time::timeout(SHELL_TIMEOUT, command.output()).await {
        Ok(Ok(output)) => ShellResult {
            exit_code: output.status.code().unwrap_or(-1),
            output: truncate(&combined_output(&output)),
        },
        Ok(Err(io_err)) => ShellResult {
            exit_code: -1,
            output: format!("failed to run command: {io_err}"),
        },
        Err(_elapsed) => ShellResult {
            exit_code: TIMEOUT_EXIT_CODE,
            output: TIMEOUT_MARKER.to_string(),
        },
    }
}

fn combined_output(output: &Output) -> String {
    let mut combined = String::with_capacity(output.stdout.len() + output.stderr.len());
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

/// If `text` exceeds [`MAX_OUTPUT_BYTES`], elide the middle, preserving the
/// first [`TRUNCATION_HEAD_BYTES`] and the tail.
fn truncate(text: &str) -> String {
    if text.len() <= MAX_OUTPUT_BYTES {
        return text.to_string();
    }
    let head_end = char_boundary_at_most(text, TRUNCATION_HEAD_BYTES);
    let tail_len = MAX_OUTPUT_BYTES.saturating_sub(head_end);
    let tail_start = char_boundary_at_least(text, text.len().saturating_sub(tail_len));
    format!(
        "{}{TRUNCATION_MARKER}{}",
        &text[..head_end],
        &text[tail_start..]
    )
}

fn char_boundary_at_most(s: &str, idx: usize) -> usize {
    let idx = idx.min(s.len());
    (0..=idx).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

fn char_boundary_at_least(s: &str, idx: usize) -> usize {
    let idx = idx.min(s.len());
    (idx..=s.len()).find(|&i| s.is_char_boundary(i)).unwrap_or(s.len())
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
