// SPDX-License-Identifier: MIT

//! Heartbeat Scheduler: the unattended loop that reconciles
//! a workspace's task graph once per tick, driving the [`SkillEngine`]
//! without a human in front of it.

use crate::engine::SkillEngine;
use crate::error::EngineError;
use crate::skill_loader::load_skill;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tenazas_bus::EventBus;
use tenazas_core::{
    BusEvent, Clock, HeartbeatDef, Owner, Session, SessionId, Task, TaskId, TaskStatus,
    TaskStatusPayload,
};
use tenazas_storage::{select_next_task, SessionStore, StorageRoot, TaskStore};

/// Drives every configured [`HeartbeatDef`] one tick at a time.
///
/// Each definition gets its own session per task, reused across ticks for
/// as long as this scheduler instance lives: the map below is the only
/// place that linkage is tracked, since a [`Session`]'s `task_link` field
/// records the reverse edge but isn't indexed for lookup by task id.
pub struct HeartbeatScheduler {
    storage: StorageRoot,
    sessions: SessionStore,
    tasks: TaskStore,
    engine: Arc<SkillEngine>,
    bus: EventBus,
    clock: Arc<dyn Clock>,
    sessions_by_task: Mutex<HashMap<TaskId, SessionId>>,
}

impl HeartbeatScheduler {
    pub fn new(
        storage: StorageRoot,
        sessions: SessionStore,
        tasks: TaskStore,
        engine: Arc<SkillEngine>,
        bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            sessions,
            tasks,
            engine,
            bus,
            clock,
            sessions_by_task: Mutex::new(HashMap::new()),
        }
    }

    /// Run one tick for a single heartbeat definition.
    pub async fn tick(&self, def: &HeartbeatDef) -> Result<(), EngineError> {
        let tasks = self.tasks.list(&def.workspace)?;
        let in_progress = tasks.iter().find(|t| t.status == TaskStatus::InProgress).cloned();

        let chosen = match in_progress {
            Some(task) => task,
            None => match select_next_task(&tasks) {
                Some(task) => task.clone(),
                None => return Ok(()),
            },
        };

        if chosen.status == TaskStatus::InProgress && chosen.failure_count >= 3 {
            // No session is created for a task that's about to be blocked:
            // attribute the event to its existing owner session if one was
            // recorded, without touching the store.
            let session_id = chosen
                .owner
                .as_ref()
                .and_then(|o| o.session_id.as_deref())
                .map(SessionId::new)
                .unwrap_or_else(|| SessionId::new(format!("heartbeat-blocked-{}", chosen.id)));
            self.tasks
                .transition(&def.workspace, &chosen.id, TaskStatus::Blocked, None)?;
            self.bus.publish(BusEvent::EventTaskStatus {
                session_id,
                payload: TaskStatusPayload::Blocked {
                    node: String::new(),
                    instruction: String::new(),
                    reason: "failure_count exceeded".to_string(),
                },
            });
            return Ok(());
        }

        let session = self.ensure_session_for_task(&def.workspace, &def.name, &chosen)?;
        self.claim(def, &chosen, &session)?;

        for skill_name in &def.skills {
            let skill = load_skill(&self.storage, skill_name)?;
            self.engine.run(&session.id, &skill).await?;
        }
        Ok(())
    }

    /// Set the owner triple to this heartbeat's instance id and, if unset,
    /// `started_at`. A brand-new `todo` task goes through the validated
    /// `todo -> in-progress` transition; a task already `in-progress` (being
    /// resumed) only has its owner/`started_at` fields touched directly,
    /// since `in-progress -> in-progress` is not a valid transition.
    fn claim(&self, def: &HeartbeatDef, task: &Task, session: &Session) -> Result<(), EngineError> {
        let owner = Owner {
            pid: std::process::id(),
            instance_id: def.instance_id(),
            session_id: Some(session.id.to_string()),
        };
        if task.status == TaskStatus::Todo {
            self.tasks
                .transition(&def.workspace, &task.id, TaskStatus::InProgress, Some(owner))?;
        } else {
            let mut task = task.clone();
            task.owner = Some(owner);
            if task.started_at.is_none() {
                task.started_at = Some(self.clock.now());
            }
            self.tasks.save(&def.workspace, &task)?;
        }
        Ok(())
    }

    /// Find or create the session bound to `task`, titled `"Heartbeat: <name>"`.
    fn ensure_session_for_task(
        &self,
        workspace: &std::path::Path,
        heartbeat_name: &str,
        task: &Task,
    ) -> Result<Session, EngineError> {
        if let Some(id) = self.sessions_by_task.lock().get(&task.id).cloned() {
            if let Ok(session) = self.sessions.load(&id) {
                return Ok(session);
            }
        }
        let mut session = self.sessions.create(workspace.to_path_buf())?;
        session.title = format!("Heartbeat: {heartbeat_name}");
        session.task_link = Some(task.id.clone());
        self.sessions.save(&session)?;
        self.sessions_by_task
            .lock()
            .insert(task.id.clone(), session.id.clone());
        Ok(session)
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
