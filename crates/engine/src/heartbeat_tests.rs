use super::*;
use std::collections::HashMap;
use tenazas_adapters::{AgentClientRegistry, FakeAgentClient};
use tenazas_core::{SessionStatus, SkillGraph, StateDef, StateType, SystemClock};

fn write_end_skill(storage: &StorageRoot, name: &str) {
    let mut states = HashMap::new();
    states.insert(
        "s".to_string(),
        StateDef {
            state_type: StateType::End,
            session_role: None,
            next: None,
            on_fail_route: None,
            max_retries: 0,
            approval_mode: None,
            model_tier: None,
            command: None,
            instruction: None,
            pre_action_cmd: None,
            verify_cmd: None,
            post_action_cmd: None,
            on_fail_prompt: None,
        },
    );
    let skill = SkillGraph {
        name: name.to_string(),
        base_dir: std::path::PathBuf::new(),
        initial_state: "s".to_string(),
        max_loops: None,
        max_budget_usd: None,
        states,
    };
    let path = storage.skill_def_path(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_vec(&skill).unwrap()).unwrap();
}

struct Fixture {
    scheduler: HeartbeatScheduler,
    sessions: SessionStore,
    tasks: TaskStore,
    storage: StorageRoot,
    _dir: tempfile::TempDir,
}

fn setup() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = StorageRoot::new(dir.path());
    let clock: Arc<dyn tenazas_core::Clock> = Arc::new(SystemClock);

    let sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
    let tasks = TaskStore::new(storage.clone(), Arc::clone(&clock));

    let agent = FakeAgentClient::new();
    let mut registry = AgentClientRegistry::new();
    registry.register("default", Arc::new(agent));
    let bus = EventBus::new();
    let engine_sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
    let engine = Arc::new(SkillEngine::new(engine_sessions, registry, bus.clone(), Arc::clone(&clock)));

    let scheduler_sessions = SessionStore::new(storage.clone(), Arc::clone(&clock));
    let scheduler_tasks = TaskStore::new(storage.clone(), Arc::clone(&clock));
    let scheduler = HeartbeatScheduler::new(
        storage.clone(),
        scheduler_sessions,
        scheduler_tasks,
        engine,
        bus,
        clock,
    );

    Fixture {
        scheduler,
        sessions,
        tasks,
        storage,
        _dir: dir,
    }
}

#[tokio::test]
async fn s7_heartbeat_blocks_exhausted_task() {
    let fx = setup();
    let workspace = fx._dir.path().to_path_buf();
    write_end_skill(&fx.storage, "triage");

    let created = fx.tasks.create(&workspace, "stuck").expect("create task");
    let in_progress = fx
        .tasks
        .transition(&workspace, &created.id, TaskStatus::InProgress, None)
        .expect("transition to in-progress");
    let mut exhausted = in_progress;
    exhausted.failure_count = 3;
    fx.tasks.save(&workspace, &exhausted).expect("save");

    let def = HeartbeatDef {
        name: "nightly".to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: workspace.clone(),
        skills: vec!["triage".to_string()],
    };

    assert!(fx.sessions.list_active().expect("list").is_empty());
    fx.scheduler.tick(&def).await.expect("tick");

    let reloaded = fx.tasks.load(&workspace, &created.id).expect("load");
    assert_eq!(reloaded.status, TaskStatus::Blocked);
    assert!(reloaded.owner.is_none());
    assert!(
        fx.sessions.list_active().expect("list").is_empty(),
        "no new session should be started on this tick"
    );
}

#[tokio::test]
async fn starts_next_ready_task_and_runs_its_skills() {
    let fx = setup();
    let workspace = fx._dir.path().to_path_buf();
    write_end_skill(&fx.storage, "triage");

    let created = fx.tasks.create(&workspace, "ready").expect("create task");

    let def = HeartbeatDef {
        name: "nightly".to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: workspace.clone(),
        skills: vec!["triage".to_string()],
    };

    fx.scheduler.tick(&def).await.expect("tick");

    let reloaded = fx.tasks.load(&workspace, &created.id).expect("load");
    assert_eq!(reloaded.status, TaskStatus::InProgress);
    let owner = reloaded.owner.expect("owner set");
    assert_eq!(owner.instance_id, "heartbeat-nightly");
    assert!(reloaded.started_at.is_some());

    let active = fx.sessions.list_active().expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Heartbeat: nightly");

    let session = fx.sessions.load(&active[0].id).expect("load session");
    assert_eq!(session.task_link, Some(created.id));
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn resumes_existing_in_progress_task_without_retransitioning() {
    let fx = setup();
    let workspace = fx._dir.path().to_path_buf();
    write_end_skill(&fx.storage, "triage");

    let created = fx.tasks.create(&workspace, "mid-flight").expect("create task");
    fx.tasks
        .transition(&workspace, &created.id, TaskStatus::InProgress, None)
        .expect("transition to in-progress");

    let def = HeartbeatDef {
        name: "nightly".to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: workspace.clone(),
        skills: vec!["triage".to_string()],
    };

    fx.scheduler.tick(&def).await.expect("tick");

    let reloaded = fx.tasks.load(&workspace, &created.id).expect("load");
    assert_eq!(reloaded.status, TaskStatus::InProgress);
    assert_eq!(reloaded.owner.expect("owner set").instance_id, "heartbeat-nightly");
}
