use super::*;
use std::fs;
use tenazas_storage::StorageRoot;

fn write_def(storage: &StorageRoot, name: &str, workspace: &std::path::Path) {
    fs::create_dir_all(storage.heartbeats_dir()).unwrap();
    let def = HeartbeatDef {
        name: name.to_string(),
        interval: "*/5 * * * *".to_string(),
        workspace: workspace.to_path_buf(),
        skills: vec!["triage".to_string()],
    };
    fs::write(
        storage.heartbeat_def_path(name),
        serde_json::to_vec(&def).unwrap(),
    )
    .unwrap();
}

#[test]
fn missing_directory_yields_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let defs = load_heartbeat_defs(&storage).unwrap();
    assert!(defs.is_empty());
}

#[test]
fn loads_every_def_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let ws = dir.path().join("ws");
    write_def(&storage, "zeta", &ws);
    write_def(&storage, "alpha", &ws);

    let defs = load_heartbeat_defs(&storage).unwrap();
    let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn loads_one_named_def() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let ws = dir.path().join("ws");
    write_def(&storage, "alpha", &ws);

    let def = load_heartbeat_def(&storage, "alpha").unwrap();
    assert_eq!(def.name, "alpha");
}

#[test]
fn named_def_not_found_is_a_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let err = load_heartbeat_def(&storage, "missing").unwrap_err();
    assert!(matches!(err, EngineError::HeartbeatNotFound(name) if name == "missing"));
}

#[test]
fn ignores_non_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::new(dir.path());
    let ws = dir.path().join("ws");
    write_def(&storage, "alpha", &ws);
    fs::write(storage.heartbeats_dir().join("README.md"), b"not a def").unwrap();

    let defs = load_heartbeat_defs(&storage).unwrap();
    assert_eq!(defs.len(), 1);
}
