// SPDX-License-Identifier: MIT

//! Task Store: id allocation, front-matter persistence, dependency graph,
//! ready-set selection, and archival.

use crate::atomic::write_atomic;
use crate::error::StorageError;
use crate::lockfile::FileLock;
use crate::paths::StorageRoot;
use fs2::FileExt;
use std::collections::{HashSet, VecDeque};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tenazas_core::{Clock, Owner, Task, TaskId, TaskStatus};

const FRONT_MATTER_DELIM: &str = "---";

pub struct TaskStore {
    root: StorageRoot,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    pub fn new(root: StorageRoot, clock: Arc<dyn Clock>) -> Self {
        Self { root, clock }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Allocate the next monotonic id for `workspace` under an exclusive
    /// lock on the sequence file.
    pub fn allocate_id(&self, workspace: &Path) -> Result<TaskId, StorageError> {
        let path = self.root.task_sequence_path(workspace);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| StorageError::LockContention(format!("{}: {e}", path.display())))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let current: u64 = contents.trim().parse().unwrap_or(0);
        let next = current + 1;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(next.to_string().as_bytes())?;
        file.sync_all()?;
        FileExt::unlock(&file).ok();
        Ok(TaskId::from_seq(next))
    }

    pub fn create(&self, workspace: &Path, title: impl Into<String>) -> Result<Task, StorageError> {
        let id = self.allocate_id(workspace)?;
        let task = Task::new(id, title, self.clock.now());
        self.save(workspace, &task)?;
        Ok(task)
    }

    pub fn save(&self, workspace: &Path, task: &Task) -> Result<(), StorageError> {
        let path = self.root.task_path(workspace, task.id.as_str());
        write_atomic(&path, render_front_matter(task)?.as_bytes())
    }

    pub fn load(&self, workspace: &Path, id: &TaskId) -> Result<Task, StorageError> {
        let path = self.root.task_path(workspace, id.as_str());
        let bytes = std::fs::read_to_string(&path)
            .map_err(|_| StorageError::TaskNotFound(id.to_string()))?;
        parse_front_matter(&bytes, id)
    }

    pub fn list(&self, workspace: &Path) -> Result<Vec<Task>, StorageError> {
        let dir = self.root.tasks_dir(workspace);
        let mut tasks = Vec::new();
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Ok(tasks);
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let id = TaskId::from(stem);
                if let Ok(task) = self.load(workspace, &id) {
                    tasks.push(task);
                }
            }
        }
        Ok(tasks)
    }

    /// Apply a validated status transition, persisting the result.
    pub fn transition(
        &self,
        workspace: &Path,
        id: &TaskId,
        to: TaskStatus,
        owner: Option<Owner>,
    ) -> Result<Task, StorageError> {
        let mut task = self.load(workspace, id)?;
        task.apply_transition(to, self.clock.now(), owner)?;
        self.save(workspace, &task)?;
        Ok(task)
    }

    pub fn reset(&self, workspace: &Path, id: &TaskId) -> Result<Task, StorageError> {
        let mut task = self.load(workspace, id)?;
        task.reset(self.clock.now());
        self.save(workspace, &task)?;
        Ok(task)
    }

    /// Add a dependency edge: `task` is blocked_by `dep`. Idempotent,
    /// rejects self-edges, rolls back on cycle.
    pub fn add_dependency(
        &self,
        workspace: &Path,
        task_id: &TaskId,
        dep_id: &TaskId,
    ) -> Result<(), StorageError> {
        if task_id == dep_id {
            return Err(StorageError::SelfDependency(task_id.clone()));
        }
        let mut task = self.load(workspace, task_id)?;
        if task.blocked_by.contains(dep_id) {
            return Ok(()); // idempotent
        }

        // Cycle check: would dep_id (transitively, through its own blocked_by
        // edges) already depend on task_id? If so, adding this edge closes a
        // cycle. Checked *before* any file is written.
        if self.reaches(workspace, dep_id, task_id)? {
            return Err(StorageError::Cycle {
                a: task_id.clone(),
                b: dep_id.clone(),
            });
        }

        let mut dep = self.load(workspace, dep_id)?;
        task.blocked_by.push(dep_id.clone());
        dep.blocks.push(task_id.clone());
        self.save(workspace, &task)?;
        self.save(workspace, &dep)?;
        Ok(())
    }

    /// Remove a dependency edge, tolerating a missing `dep` file.
    pub fn remove_dependency(
        &self,
        workspace: &Path,
        task_id: &TaskId,
        dep_id: &TaskId,
    ) -> Result<(), StorageError> {
        let mut task = self.load(workspace, task_id)?;
        task.blocked_by.retain(|d| d != dep_id);
        self.save(workspace, &task)?;

        if let Ok(mut dep) = self.load(workspace, dep_id) {
            dep.blocks.retain(|d| d != task_id);
            self.save(workspace, &dep)?;
        }
        Ok(())
    }

    /// Breadth-first reachability check over `blocked_by` edges: can `to`
    /// be reached starting from `from`?
    fn reaches(&self, workspace: &Path, from: &TaskId, to: &TaskId) -> Result<bool, StorageError> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(from.clone());
        while let Some(current) = queue.pop_front() {
            if &current == to {
                return Ok(true);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Ok(task) = self.load(workspace, &current) {
                for dep in task.blocked_by {
                    queue.push_back(dep);
                }
            }
        }
        Ok(false)
    }

    /// `CheckAndArchive`: no-op unless every task in the workspace is done;
    /// otherwise archives all task files (and matching `.jsonl` logs) into
    /// `archive/<RFC3339>/`.
    pub fn check_and_archive(&self, workspace: &Path) -> Result<Option<PathBuf>, StorageError> {
        let tasks = self.list(workspace)?;
        if tasks.is_empty() || !tasks.iter().all(|t| t.status == TaskStatus::Done) {
            return Ok(None);
        }
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        Ok(Some(self.archive_ids(workspace, &ids)?))
    }

    /// `ForceArchive`: archive only the done tasks, refusing if a remaining
    /// active task is `blocked_by` one of the tasks being archived.
    pub fn force_archive(&self, workspace: &Path) -> Result<Option<PathBuf>, StorageError> {
        let tasks = self.list(workspace)?;
        let (done, active): (Vec<_>, Vec<_>) =
            tasks.into_iter().partition(|t| t.status == TaskStatus::Done);
        if done.is_empty() {
            return Ok(None);
        }
        let done_ids: HashSet<TaskId> = done.iter().map(|t| t.id.clone()).collect();
        for task in &active {
            for dep in &task.blocked_by {
                if done_ids.contains(dep) {
                    return Err(StorageError::BlockedByArchived {
                        active: task.id.clone(),
                        archived: dep.clone(),
                    });
                }
            }
        }
        let ids: Vec<TaskId> = done.iter().map(|t| t.id.clone()).collect();
        Ok(Some(self.archive_ids(workspace, &ids)?))
    }

    fn archive_ids(&self, workspace: &Path, ids: &[TaskId]) -> Result<PathBuf, StorageError> {
        let ts = self.clock.now().to_rfc3339();
        let archive_dir = self.root.task_archive_dir(workspace, &ts);
        std::fs::create_dir_all(&archive_dir)?;
        for id in ids {
            let src = self.root.task_path(workspace, id.as_str());
            if src.exists() {
                std::fs::rename(&src, archive_dir.join(format!("{id}.md")))?;
            }
            let log_src = self.root.tasks_dir(workspace).join(format!("{id}.jsonl"));
            if log_src.exists() {
                std::fs::rename(&log_src, archive_dir.join(format!("{id}.jsonl")))?;
            }
        }
        Ok(archive_dir)
    }
}

/// `HasCycle(tasks)`: true iff the `blocked_by` digraph over an in-memory
/// task list contains a cycle. Pure, no filesystem access, for use where a
/// caller already has the full task list loaded (contrast
/// [`TaskStore::add_dependency`]'s per-edge on-disk `reaches` check).
pub fn has_cycle(tasks: &[Task]) -> bool {
    let by_id: std::collections::HashMap<&TaskId, &Task> =
        tasks.iter().map(|t| (&t.id, t)).collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }
    let mut marks: std::collections::HashMap<&TaskId, Mark> = std::collections::HashMap::new();

    fn visit<'a>(
        id: &'a TaskId,
        by_id: &std::collections::HashMap<&'a TaskId, &'a Task>,
        marks: &mut std::collections::HashMap<&'a TaskId, Mark>,
    ) -> bool {
        match marks.get(id) {
            Some(Mark::Visiting) => return true,
            Some(Mark::Done) => return false,
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        if let Some(task) = by_id.get(id) {
            for dep in &task.blocked_by {
                if visit(dep, by_id, marks) {
                    return true;
                }
            }
        }
        marks.insert(id, Mark::Done);
        false
    }

    tasks.iter().any(|t| visit(&t.id, &by_id, &mut marks))
}

/// `SelectNextTask`: todo tasks whose every `blocked_by` is done, tie-broken
/// by higher priority first, then earlier `created_at`.
pub fn select_next_task(tasks: &[Task]) -> Option<&Task> {
    let done: HashSet<&TaskId> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .map(|t| &t.id)
        .collect();
    tasks
        .iter()
        .filter(|t| t.is_ready(|dep| done.contains(dep)))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        })
}

/// Serialize a task as JSON front matter delimited by `---` lines, followed
/// by its free-form Markdown content.
fn render_front_matter(task: &Task) -> Result<String, StorageError> {
    #[derive(serde::Serialize)]
    struct FrontMatter<'a> {
        #[serde(flatten)]
        task: &'a Task,
    }
    let json = serde_json::to_string_pretty(&FrontMatter { task })?;
    Ok(format!(
        "{FRONT_MATTER_DELIM}\n{json}\n{FRONT_MATTER_DELIM}\n{}",
        task.content
    ))
}

/// Parse JSON front matter; falls back to a legacy `key: value` block when
/// JSON parsing fails, so old files migrate transparently.
fn parse_front_matter(bytes: &str, id: &TaskId) -> Result<Task, StorageError> {
    let mut parts = bytes.splitn(3, FRONT_MATTER_DELIM);
    let _leading = parts.next(); // before the first delimiter, normally empty
    let front = parts.next().ok_or_else(|| StorageError::TaskNotFound(id.to_string()))?;
    let content = parts.next().unwrap_or("").trim_start_matches('\n').to_string();

    if let Ok(mut task) = serde_json::from_str::<Task>(front) {
        task.content = content;
        return Ok(task);
    }
    parse_legacy_front_matter(front, content, id)
}

fn parse_legacy_front_matter(front: &str, content: String, id: &TaskId) -> Result<Task, StorageError> {
    let mut fields = std::collections::HashMap::new();
    for line in front.lines() {
        if let Some((k, v)) = line.split_once(':') {
            fields.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    let now = chrono::Utc::now();
    let mut task = Task::new(id.clone(), fields.get("title").cloned().unwrap_or_default(), now);
    if let Some(status) = fields.get("status") {
        task.status = match status.as_str() {
            "todo" => TaskStatus::Todo,
            "in-progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "blocked" => TaskStatus::Blocked,
            _ => TaskStatus::Todo,
        };
    }
    if let Some(priority) = fields.get("priority").and_then(|p| p.parse().ok()) {
        task.priority = priority;
    }
    task.content = content;
    Ok(task)
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
