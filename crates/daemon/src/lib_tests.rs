use super::*;
use std::collections::HashMap;
use tenazas_adapters::FakeAgentClient;
use tenazas_core::{HeartbeatDef, SkillGraph, StateDef, StateType, TaskStatus};
use tenazas_storage::TaskStore;

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

fn fake_registry() -> AgentClientRegistry {
    let mut registry = AgentClientRegistry::new();
    registry.register("default", Arc::new(FakeAgentClient::new()));
    registry
}

#[tokio::test]
async fn tick_once_skips_heartbeats_with_no_ready_or_in_progress_task() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let ctx = DaemonContext::with_registry(storage.clone(), fake_registry());

    std::fs::create_dir_all(storage.heartbeats_dir()).unwrap();
    let def = HeartbeatDef {
        name: "nightly".to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: dir.path().to_path_buf(),
        skills: vec!["triage".to_string()],
    };
    std::fs::write(
        storage.heartbeat_def_path(&def.name),
        serde_json::to_vec(&def).unwrap(),
    )
    .unwrap();

    ctx.tick_once().await.expect("tick_once");
}

#[tokio::test]
async fn tick_once_drives_a_ready_task_through_an_end_skill() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    write_end_skill(&storage, "triage");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tasks = TaskStore::new(storage.clone(), Arc::clone(&clock));
    let workspace = dir.path().to_path_buf();
    let created = tasks.create(&workspace, "do the thing").expect("create task");

    let ctx = DaemonContext::with_registry(storage.clone(), fake_registry());
    std::fs::create_dir_all(storage.heartbeats_dir()).unwrap();
    let def = HeartbeatDef {
        name: "nightly".to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: workspace.clone(),
        skills: vec!["triage".to_string()],
    };
    std::fs::write(
        storage.heartbeat_def_path(&def.name),
        serde_json::to_vec(&def).unwrap(),
    )
    .unwrap();

    ctx.tick_once().await.expect("tick_once");

    let reloaded = tasks.load(&workspace, &created.id).expect("load");
    assert_eq!(reloaded.status, TaskStatus::InProgress);
    assert!(reloaded.owner.is_some());
}

#[tokio::test]
async fn run_forever_stops_on_shutdown_signal() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let ctx = DaemonContext::with_registry(storage, fake_registry());

    let (tx, rx) = tokio::sync::oneshot::channel();
    tx.send(()).unwrap();
    let shutdown = async {
        let _ = rx.await;
    };

    tokio::time::timeout(
        Duration::from_secs(2),
        ctx.run_forever(Duration::from_millis(10), shutdown),
    )
    .await
    .expect("run_forever should stop promptly on shutdown");
}
