use super::*;
use tenazas_core::SystemClock;
use tempfile::tempdir;

fn store(root_dir: &Path) -> SessionStore {
    SessionStore::new(StorageRoot::new(root_dir), Arc::new(SystemClock))
}

use std::path::Path;

#[test]
fn create_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let s = store(dir.path());
    let ws = dir.path().join("ws1");
    let created = s.create(ws.clone()).unwrap();
    let loaded = s.load(&created.id).unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.workspace, ws);
}

#[test]
fn load_missing_session_errors() {
    let dir = tempdir().unwrap();
    let s = store(dir.path());
    let err = s.load(&SessionId::new("nope")).unwrap_err();
    assert!(matches!(err, StorageError::SessionNotFound(_)));
}

#[test]
fn archived_sessions_are_excluded_from_active_listing() {
    let dir = tempdir().unwrap();
    let s = store(dir.path());
    let ws = dir.path().join("ws1");
    let mut created = s.create(ws).unwrap();
    assert_eq!(s.list_active().unwrap().len(), 1);
    s.archive(&mut created).unwrap();
    assert_eq!(s.list_active().unwrap().len(), 0);
    // archived record still readable as a distinct sibling file.
    let archive_path = s
        .root()
        .session_archive_path(&created.workspace, created.id.as_str());
    assert!(archive_path.exists());
}

#[test]
fn rebuild_index_recovers_from_corrupt_index_file() {
    let dir = tempdir().unwrap();
    let s = store(dir.path());
    let ws = dir.path().join("ws1");
    s.create(ws).unwrap();
    std::fs::write(s.root().global_index_path(), b"not json").unwrap();
    let entries = s.list_active().unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn audit_append_and_tail_round_trip() {
    use chrono::Utc;
    use tenazas_core::AuditKind;

    let dir = tempdir().unwrap();
    let s = store(dir.path());
    let ws = dir.path().join("ws1");
    let session = s.create(ws).unwrap();
    let entry = AuditEntry::new(Utc::now(), AuditKind::Info, "engine", "hi");
    s.append_audit(&session, &entry).unwrap();
    let tail = s.tail_audit(&session, 10).unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].content, "hi");
}
