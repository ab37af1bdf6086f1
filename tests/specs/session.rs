//! Black-box coverage of `tenazas session ls|show|rm` over the Session
//! Store (spec.md §3 "Session").

use crate::prelude::{stdout_of, Fixture};

fn create_session_via_prompt(fx: &Fixture) -> String {
    let output = fx
        .cmd()
        .args(["prompt", "hello there", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    assert!(output.status.success(), "{}", stdout_of(&output));

    let ls = fx.cmd().args(["session", "ls"]).output().expect("run tenazas");
    let ls_out = stdout_of(&ls);
    ls_out
        .lines()
        .next()
        .expect("at least one active session")
        .split_whitespace()
        .next()
        .expect("id is the first column")
        .to_string()
}

#[test]
fn prompt_creates_a_session_that_ls_then_show_can_see() {
    let fx = Fixture::new();
    let id = create_session_via_prompt(&fx);

    let ls = fx.cmd().args(["session", "ls"]).output().expect("run tenazas");
    assert!(stdout_of(&ls).contains(&id));

    let show = fx
        .cmd()
        .args(["session", "show", &id])
        .output()
        .expect("run tenazas");
    let show_out = stdout_of(&show);
    assert!(show_out.contains(&format!("id: {id}")));
    assert!(show_out.contains("--- last"));
}

#[test]
fn rm_archives_a_session_and_drops_it_from_ls() {
    let fx = Fixture::new();
    let id = create_session_via_prompt(&fx);

    fx.cmd().args(["session", "rm", &id]).assert().success();

    let ls = fx.cmd().args(["session", "ls"]).output().expect("run tenazas");
    assert!(!stdout_of(&ls).contains(&id));
}

#[test]
fn showing_an_unknown_session_id_is_a_clean_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["session", "show", "nope-not-real"])
        .assert()
        .failure();
}
