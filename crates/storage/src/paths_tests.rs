use super::*;

#[test]
fn slugify_is_stable_and_collision_free_for_distinct_paths() {
    let a = slugify(Path::new("/home/user/projectA"));
    let b = slugify(Path::new("/home/user/projectB"));
    assert_ne!(a, b);
    assert_eq!(a, slugify(Path::new("/home/user/projectA")));
}

#[test]
fn slugify_never_produces_path_separators() {
    let s = slugify(Path::new("/a/b/c with spaces/d"));
    assert!(!s.contains('/'));
    assert!(!s.contains(' '));
}

#[test]
fn storage_root_layout_matches_spec() {
    let root = StorageRoot::new("/store");
    assert_eq!(root.sessions_dir(), PathBuf::from("/store/sessions"));
    assert_eq!(
        root.global_index_path(),
        PathBuf::from("/store/sessions/.global_index.json")
    );
    assert_eq!(
        root.session_index_pointer_path("abc"),
        PathBuf::from("/store/sessions/.index/abc")
    );
    assert_eq!(root.registry_path(), PathBuf::from("/store/registry.json"));
    assert_eq!(
        root.skills_registry_path(),
        PathBuf::from("/store/skills_registry.json")
    );
}
