use super::*;
use tempfile::tempdir;

#[test]
fn write_atomic_creates_parent_dirs_and_leaves_no_tmp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("file.json");
    write_atomic(&path, b"{\"a\":1}").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"{\"a\":1}");
    assert!(!path.with_file_name("file.json.tmp").exists());
}

#[test]
fn write_atomic_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("file.json");
    write_atomic(&path, b"first").unwrap();
    write_atomic(&path, b"second").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");
}
