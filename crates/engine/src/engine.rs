// SPDX-License-Identifier: MIT

//! The Skill Engine: a retrying, recoverable state-machine interpreter
//!. One [`SkillEngine`] drives every session in a process;
//! it owns the per-session busy flag ("exactly one run loop per session"),
//! the cancellation-token table, and the intervention channel, and is the
//! single place audit entries are appended and bus events published from.

use crate::cancel_registry::CancelRegistry;
use crate::env;
use crate::error::EngineError;
use crate::intervention::{InterventionDecision, InterventionRegistry};
use crate::prompt::{build_prompt, render_fail_feedback, resolve_instruction};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tenazas_adapters::{
    run_shell, AgentClientError, AgentClientRegistry, ChunkCallback, IntentCallback, RunCallbacks,
    RunOptions, SessionIdCallback, ThoughtCallback, ThoughtParser,
};
use tenazas_bus::EventBus;
use tenazas_core::{
    AuditEntry, AuditKind, BusEvent, Clock, Session, SessionId, SessionStatus, SkillGraph,
    StateDef, StateType, TaskStatusPayload, RESUME_SENTINEL,
};
use tenazas_storage::SessionStore;

/// One step's outcome, decided by [`SkillEngine::step_tool`] or
/// [`SkillEngine::step_action_loop`] and applied by the run loop.
enum Step {
    Goto(String),
    Failed(String),
    /// The agent call observed cancellation; the run loop exits leaving
    /// session status untouched.
    Cancelled,
}

/// Where a failed `pre_action_cmd`/agent call/`verify_cmd` routes to next.
enum Escalation {
    StayRetry,
    Route(String),
    Intervene,
}

enum ChunkEvent {
    Visible(String),
    Thought(String),
}

/// Captures everything the Agent Client streams through its callbacks
/// during one `run()` call, so the engine can log it in arrival order once
/// the call returns rather than touching storage from inside a `Fn`
/// callback.
struct StreamCapture {
    parser: Arc<Mutex<ThoughtParser>>,
    events: Arc<Mutex<Vec<ChunkEvent>>>,
    announced: Arc<Mutex<Option<String>>>,
    intent: Arc<Mutex<Option<String>>>,
}

impl StreamCapture {
    fn new() -> Self {
        Self {
            parser: Arc::new(Mutex::new(ThoughtParser::new())),
            events: Arc::new(Mutex::new(Vec::new())),
            announced: Arc::new(Mutex::new(None)),
            intent: Arc::new(Mutex::new(None)),
        }
    }

    fn callbacks(&self) -> RunCallbacks {
        let parser = Arc::clone(&self.parser);
        let events = Arc::clone(&self.events);
        let on_chunk: ChunkCallback = Arc::new(move |text: &str| {
            let split = parser.lock().push(text);
            let mut events = events.lock();
            if !split.visible.is_empty() {
                events.push(ChunkEvent::Visible(split.visible));
            }
            if !split.thought.is_empty() {
                events.push(ChunkEvent::Thought(split.thought));
            }
        });

        let events_thought = Arc::clone(&self.events);
        let on_thought: ThoughtCallback = Arc::new(move |text: &str| {
            events_thought.lock().push(ChunkEvent::Thought(text.to_string()));
        });

        let announced = Arc::clone(&self.announced);
        let on_session_id: SessionIdCallback = Arc::new(move |id: &str| {
            *announced.lock() = Some(id.to_string());
        });

        let intent = Arc::clone(&self.intent);
        let on_intent: IntentCallback = Arc::new(move |text: &str| {
            *intent.lock() = Some(text.to_string());
        });

        RunCallbacks {
            on_chunk: Some(on_chunk),
            on_session_id: Some(on_session_id),
            on_thought: Some(on_thought),
            on_tool_event: None,
            on_intent: Some(on_intent),
            on_permission: None,
        }
    }

    /// Flush the held thought-parser buffer and drain every captured event
    /// in the order it arrived.
    fn finish(&self) -> Vec<ChunkEvent> {
        let flushed = self.parser.lock().finish();
        let mut events = std::mem::take(&mut *self.events.lock());
        if !flushed.visible.is_empty() {
            events.push(ChunkEvent::Visible(flushed.visible));
        }
        if !flushed.thought.is_empty() {
            events.push(ChunkEvent::Thought(flushed.thought));
        }
        events
    }

    fn announced_session_id(&self) -> Option<String> {
        self.announced.lock().clone()
    }

    fn intent(&self) -> Option<String> {
        self.intent.lock().clone()
    }
}

pub struct SkillEngine {
    sessions: SessionStore,
    agents: AgentClientRegistry,
    bus: EventBus,
    clock: Arc<dyn Clock>,
    cancels: CancelRegistry,
    interventions: InterventionRegistry,
    busy: Mutex<HashSet<SessionId>>,
    default_max_loops: u32,
}

impl SkillEngine {
    pub fn new(
        sessions: SessionStore,
        agents: AgentClientRegistry,
        bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            agents,
            bus,
            clock,
            cancels: CancelRegistry::new(),
            interventions: InterventionRegistry::new(),
            busy: Mutex::new(HashSet::new()),
            default_max_loops: env::default_max_loops(),
        }
    }

    /// Fire the cancellation token registered for `session_id`, if a run is
    /// currently active for it.
    pub fn cancel_session(&self, session_id: &SessionId) -> bool {
        self.cancels.cancel(session_id)
    }

    /// Resolve a blocked intervention with one of `retry` / `proceed_to_fail`
    /// / `abort`.
    pub fn resolve_intervention(&self, session_id: &SessionId, decision: InterventionDecision) -> bool {
        self.interventions.resolve(session_id, decision)
    }

    fn try_acquire(&self, id: &SessionId) -> bool {
        let mut busy = self.busy.lock();
        if busy.contains(id) {
            return false;
        }
        busy.insert(id.clone());
        true
    }

    fn release(&self, id: &SessionId) {
        self.busy.lock().remove(id);
    }

    async fn wait_for_release(&self, id: &SessionId) {
        for _ in 0..50 {
            if !self.busy.lock().contains(id) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    fn log(
        &self,
        session: &Session,
        kind: AuditKind,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), EngineError> {
        let entry = AuditEntry::new(self.clock.now(), kind, source, content);
        self.sessions.append_audit(session, &entry)?;
        self.bus.publish(BusEvent::EventAudit {
            session_id: session.id.clone(),
            entry,
        });
        Ok(())
    }

    fn log_with_exit(
        &self,
        session: &Session,
        kind: AuditKind,
        source: impl Into<String>,
        content: impl Into<String>,
        exit_code: i32,
    ) -> Result<(), EngineError> {
        let entry = AuditEntry::new(self.clock.now(), kind, source, content).with_exit_code(exit_code);
        self.sessions.append_audit(session, &entry)?;
        self.bus.publish(BusEvent::EventAudit {
            session_id: session.id.clone(),
            entry,
        });
        Ok(())
    }

    fn publish_status(&self, session: &Session, payload: TaskStatusPayload) {
        self.bus.publish(BusEvent::EventTaskStatus {
            session_id: session.id.clone(),
            payload,
        });
    }

    /// `Run(skill, session)`. Idempotent under
    /// concurrent invocation on the same session id: a second caller
    /// returns immediately without side effects.
    pub async fn run(&self, session_id: &SessionId, skill: &SkillGraph) -> Result<(), EngineError> {
        if !self.try_acquire(session_id) {
            return Ok(());
        }
        let outcome = self.run_loop(session_id, skill).await;
        self.cancels.unregister(session_id);
        self.release(session_id);
        outcome
    }

    async fn run_loop(&self, session_id: &SessionId, skill: &SkillGraph) -> Result<(), EngineError> {
        let mut session = self.sessions.load(session_id)?;
        let is_resume = session
            .active_node
            .as_deref()
            .map(|n| !n.is_empty())
            .unwrap_or(false);
        let mut active_node = if is_resume {
            session.pending_feedback = RESUME_SENTINEL.to_string();
            session.active_node.clone().unwrap_or_default()
        } else {
            skill.initial_state.clone()
        };
        session.active_skill = Some(skill.name.clone());
        session.status = SessionStatus::Running;
        session.updated_at = self.clock.now();
        self.sessions.save(&session)?;
        self.publish_status(&session, TaskStatusPayload::Started);

        let token = self.cancels.register(session_id);

        loop {
            if token.is_cancelled() {
                self.log(&session, AuditKind::Info, "engine", "Operation cancelled by user")?;
                break;
            }

            if session.status == SessionStatus::Intervention {
                let rx = self.interventions.wait(session_id);
                let decision = rx.await.unwrap_or(InterventionDecision::Abort);
                match decision {
                    InterventionDecision::Retry => {
                        session.retry_count = 0;
                        session.status = SessionStatus::Running;
                        self.sessions.save(&session)?;
                        continue;
                    }
                    InterventionDecision::ProceedToFail => {
                        session.retry_count = 0;
                        session.loop_count = 0;
                        session.status = SessionStatus::Running;
                        if let Some(state) = skill.state(&active_node) {
                            if let Some(route) = &state.on_fail_route {
                                active_node = route.clone();
                            }
                        }
                        self.sessions.save(&session)?;
                        continue;
                    }
                    InterventionDecision::Abort => {
                        session.status = SessionStatus::Failed;
                        self.sessions.save(&session)?;
                        self.publish_status(
                            &session,
                            TaskStatusPayload::Failed {
                                reason: "aborted by user".to_string(),
                            },
                        );
                        break;
                    }
                }
            }

            let Some(state) = skill.state(&active_node).cloned() else {
                session.active_node = Some(active_node.clone());
                session.status = SessionStatus::Failed;
                self.sessions.save(&session)?;
                self.publish_status(
                    &session,
                    TaskStatusPayload::Failed {
                        reason: format!("State {active_node:?} not found"),
                    },
                );
                break;
            };

            if state.state_type == StateType::End {
                session.active_node = Some(active_node.clone());
                session.status = SessionStatus::Completed;
                self.sessions.save(&session)?;
                self.publish_status(&session, TaskStatusPayload::Completed);
                break;
            }

            session.active_node = Some(active_node.clone());
            self.sessions.save(&session)?;

            let step = match state.state_type {
                StateType::Tool => self.step_tool(&mut session, &state).await?,
                StateType::ActionLoop => {
                    self.step_action_loop(&mut session, skill, &active_node, &state, &token).await?
                }
                StateType::End => unreachable!("handled above"),
            };

            match step {
                Step::Goto(next) => active_node = next,
                Step::Cancelled => break,
                Step::Failed(reason) => {
                    session.status = SessionStatus::Failed;
                    self.sessions.save(&session)?;
                    self.publish_status(&session, TaskStatusPayload::Failed { reason });
                    break;
                }
            }
        }

        Ok(())
    }

    async fn step_tool(&self, session: &mut Session, state: &StateDef) -> Result<Step, EngineError> {
        let cmd = state.command.as_deref().unwrap_or("");
        let result = run_shell(&session.workspace, cmd).await;
        self.log_with_exit(session, AuditKind::CmdResult, "engine", result.output.clone(), result.exit_code)?;

        if result.exit_code == 0 {
            match &state.next {
                Some(next) => Ok(Step::Goto(next.clone())),
                None => Ok(Step::Failed(
                    "tool state succeeded with no next state configured".to_string(),
                )),
            }
        } else if let Some(route) = &state.on_fail_route {
            Ok(Step::Goto(route.clone()))
        } else {
            Ok(Step::Failed(format!(
                "tool command exited with code {}",
                result.exit_code
            )))
        }
    }

    fn decide_escalation(&self, skill: &SkillGraph, state: &StateDef, session: &Session) -> Escalation {
        let effective_max_loops = skill.max_loops.unwrap_or(self.default_max_loops);
        if session.loop_count >= effective_max_loops {
            Escalation::Intervene
        } else if state.max_retries > 0 && session.retry_count <= state.max_retries {
            Escalation::StayRetry
        } else if let Some(route) = &state.on_fail_route {
            Escalation::Route(route.clone())
        } else {
            Escalation::Intervene
        }
    }

    fn apply_escalation(
        &self,
        session: &mut Session,
        skill: &SkillGraph,
        node: &str,
        state: &StateDef,
    ) -> Result<Step, EngineError> {
        match self.decide_escalation(skill, state, session) {
            Escalation::StayRetry => {
                self.sessions.save(session)?;
                Ok(Step::Goto(node.to_string()))
            }
            Escalation::Route(route) => {
                session.retry_count = 0;
                self.sessions.save(session)?;
                Ok(Step::Goto(route))
            }
            Escalation::Intervene => {
                session.status = SessionStatus::Intervention;
                self.sessions.save(session)?;
                self.publish_status(
                    session,
                    TaskStatusPayload::Blocked {
                        node: node.to_string(),
                        instruction: state.instruction.clone().unwrap_or_default(),
                        reason: session.pending_feedback.clone(),
                    },
                );
                self.log(session, AuditKind::Intervention, "engine", session.pending_feedback.clone())?;
                Ok(Step::Goto(node.to_string()))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn step_action_loop(
        &self,
        session: &mut Session,
        skill: &SkillGraph,
        node: &str,
        state: &StateDef,
        token: &tenazas_adapters::CancellationToken,
    ) -> Result<Step, EngineError> {
        if let Some(pre) = &state.pre_action_cmd {
            if session.retry_count == 0 {
                let result = run_shell(&session.workspace, pre).await;
                self.log_with_exit(session, AuditKind::CmdResult, "engine", result.output.clone(), result.exit_code)?;
                if result.exit_code != 0 {
                    session.pending_feedback = result.output;
                    session.retry_count += 1;
                    return self.apply_escalation(session, skill, node, state);
                }
            }
        }

        let instruction = resolve_instruction(skill, state.instruction.as_deref().unwrap_or(""))?;
        let prompt = build_prompt(&instruction, &session.pending_feedback);

        let role = state.role().to_string();
        let native_session_id = session.role_cache.get(&role).cloned();
        let approval_mode = state.approval_mode.unwrap_or(session.approval_mode);
        let model_tier = state.model_tier.unwrap_or(session.model_tier);
        let budget_usd = skill.max_budget_usd.or(session.cost_ceiling);
        let yolo = session.approval_mode.is_yolo() || approval_mode.is_yolo();

        let agent_name = session.active_agent.clone().unwrap_or_else(|| "default".to_string());
        let client = self.agents.get(&agent_name)?;

        let capture = StreamCapture::new();
        let options = RunOptions {
            cancel: Some(token.clone()),
            native_session_id,
            prompt,
            workspace: session.workspace.clone(),
            approval_mode,
            yolo,
            model_tier,
            budget_usd,
            callbacks: capture.callbacks(),
        };

        let run_result = client.run(options).await;
        let visible_accum = self.drain_capture(session, &role, &capture)?;

        match run_result {
            Ok(_) => {
                self.log(session, AuditKind::LlmResponse, &role, visible_accum)?;
            }
            Err(AgentClientError::Cancelled) => {
                self.log(session, AuditKind::Info, "engine", "Operation cancelled by user")?;
                return Ok(Step::Cancelled);
            }
            Err(other) => {
                session.pending_feedback = other.to_string();
                session.retry_count += 1;
                return self.apply_escalation(session, skill, node, state);
            }
        }

        if let Some(verify) = &state.verify_cmd {
            let result = run_shell(&session.workspace, verify).await;
            self.log_with_exit(session, AuditKind::CmdResult, "engine", result.output.clone(), result.exit_code)?;
            if result.exit_code == 0 {
                self.complete_node(session, state, Some(result.output)).await?;
            } else {
                session.loop_count += 1;
                session.retry_count += 1;
                session.pending_feedback = render_fail_feedback(state.on_fail_prompt.as_deref(), &result);
                return self.apply_escalation(session, skill, node, state);
            }
        } else {
            self.complete_node(session, state, None).await?;
        }

        match &state.next {
            Some(next) => Ok(Step::Goto(next.clone())),
            None => Ok(Step::Failed(
                "action_loop state completed with no next state configured".to_string(),
            )),
        }
    }

    /// Drain a [`StreamCapture`], logging `AuditLLMChunk`/`AuditLLMThought`
    /// for every captured piece in arrival order and applying any announced
    /// native session id to the Role Cache. Returns
    /// the concatenated visible text; the caller logs the single
    /// `AuditLLMResponse` (step 4) only when the call actually succeeded —
    /// a cancelled or errored call must not produce one.
    fn drain_capture(&self, session: &mut Session, role: &str, capture: &StreamCapture) -> Result<String, EngineError> {
        let mut visible_accum = String::new();
        for event in capture.finish() {
            match event {
                ChunkEvent::Visible(text) => {
                    self.log(session, AuditKind::LlmChunk, role, text.clone())?;
                    visible_accum.push_str(&text);
                }
                ChunkEvent::Thought(text) => {
                    self.log(session, AuditKind::LlmThought, role, text)?;
                }
            }
        }
        if let Some(text) = capture.intent() {
            self.log(session, AuditKind::Intent, role, text)?;
        }
        if let Some(id) = capture.announced_session_id() {
            session.role_cache.insert(role.to_string(), id);
            self.sessions.save(session)?;
        }
        Ok(visible_accum)
    }

    async fn complete_node(
        &self,
        session: &mut Session,
        state: &StateDef,
        verify_output: Option<String>,
    ) -> Result<(), EngineError> {
        if let Some(post) = &state.post_action_cmd {
            let result = run_shell(&session.workspace, post).await;
            self.log_with_exit(session, AuditKind::CmdResult, "engine", result.output.clone(), result.exit_code)?;
        }
        session.retry_count = 0;
        session.loop_count = 0;
        session.pending_feedback = verify_output.unwrap_or_default();
        self.sessions.save(session)?;
        Ok(())
    }

    /// `ExecutePrompt(session, text)`:
    /// bypasses the skill graph entirely.
    pub async fn execute_prompt(&self, session_id: &SessionId, text: &str) -> Result<(), EngineError> {
        self.cancel_session(session_id);
        self.wait_for_release(session_id).await;
        self.try_acquire(session_id);
        let outcome = self.execute_prompt_inner(session_id, text).await;
        self.cancels.unregister(session_id);
        self.release(session_id);
        outcome
    }

    async fn execute_prompt_inner(&self, session_id: &SessionId, text: &str) -> Result<(), EngineError> {
        let mut session = self.sessions.load(session_id)?;
        let token = self.cancels.register(session_id);
        self.log(&session, AuditKind::LlmPrompt, "user", text)?;

        let role = "default".to_string();
        let native_session_id = session.role_cache.get(&role).cloned();
        let agent_name = session.active_agent.clone().unwrap_or_else(|| "default".to_string());
        let client = self.agents.get(&agent_name)?;

        let capture = StreamCapture::new();
        let options = RunOptions {
            cancel: Some(token),
            native_session_id,
            prompt: text.to_string(),
            workspace: session.workspace.clone(),
            approval_mode: session.approval_mode,
            yolo: session.approval_mode.is_yolo(),
            model_tier: session.model_tier,
            budget_usd: session.cost_ceiling,
            callbacks: capture.callbacks(),
        };

        let run_result = client.run(options).await;
        let visible_accum = self.drain_capture(&mut session, &role, &capture)?;

        match run_result {
            Ok(_) => {
                self.log(&session, AuditKind::LlmResponse, &role, visible_accum)?;
                if session.title.is_empty() {
                    session.title = text.chars().take(80).collect();
                    self.sessions.save(&session)?;
                }
                Ok(())
            }
            Err(AgentClientError::Cancelled) => {
                self.log(&session, AuditKind::Info, "engine", "Operation cancelled by user")
            }
            Err(other) => {
                self.log(&session, AuditKind::Info, "engine", format!("agent error: {other}"))?;
                Err(EngineError::Agent(other))
            }
        }
    }

    /// `ExecuteCommand(session, cmd)`:
    /// runs `cmd` then forwards its output as a direct prompt.
    pub async fn execute_command(&self, session_id: &SessionId, cmd: &str) -> Result<(), EngineError> {
        self.cancel_session(session_id);
        self.wait_for_release(session_id).await;
        self.try_acquire(session_id);
        let outcome = self.execute_command_inner(session_id, cmd).await;
        self.cancels.unregister(session_id);
        self.release(session_id);
        outcome
    }

    async fn execute_command_inner(&self, session_id: &SessionId, cmd: &str) -> Result<(), EngineError> {
        let session = self.sessions.load(session_id)?;
        let result = run_shell(&session.workspace, cmd).await;
        self.log_with_exit(&session, AuditKind::CmdResult, "engine", result.output.clone(), result.exit_code)?;
        self.execute_prompt_inner(session_id, &result.output).await
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
