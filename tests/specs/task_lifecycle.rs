//! Black-box coverage of `tenazas task` CRUD and the status machine
//! (spec.md §4.5), driven through the CLI.

use crate::prelude::{stdout_of, Fixture};

fn add_task(fx: &Fixture, title: &str) -> String {
    let output = fx
        .cmd()
        .args(["task", "add", title, "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    stdout
        .trim()
        .strip_prefix("created ")
        .expect("created <id> line")
        .to_string()
}

#[test]
fn add_then_ls_then_show_round_trips() {
    let fx = Fixture::new();
    let id = add_task(&fx, "write the docs");

    let ls = fx
        .cmd()
        .args(["task", "ls", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    assert!(stdout_of(&ls).contains(&id));
    assert!(stdout_of(&ls).contains("write the docs"));

    let show = fx
        .cmd()
        .args(["task", "show", &id, "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    let show_out = stdout_of(&show);
    assert!(show_out.contains("title: write the docs"));
    assert!(show_out.contains("status: Todo"));
}

#[test]
fn start_then_done_transitions_and_archives_when_workspace_is_clear() {
    let fx = Fixture::new();
    let id = add_task(&fx, "ship it");

    let start = fx
        .cmd()
        .args(["task", "start", &id, "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    assert!(stdout_of(&start).contains("InProgress"));

    let done = fx
        .cmd()
        .args(["task", "done", &id, "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    let done_out = stdout_of(&done);
    assert!(done_out.contains("Done"));
    assert!(done_out.contains("archived to"));
}

#[test]
fn invalid_transition_is_rejected_with_a_typed_error() {
    let fx = Fixture::new();
    let id = add_task(&fx, "already shipped");

    fx.cmd()
        .args(["task", "start", &id, "--workspace", fx.workspace_str()])
        .assert()
        .success();
    fx.cmd()
        .args(["task", "done", &id, "--workspace", fx.workspace_str()])
        .assert()
        .success();

    // done -> blocked is not a legal transition (spec.md §4.5's machine:
    // `done` only reopens to `todo`).
    fx.cmd()
        .args(["task", "block", &id, "--workspace", fx.workspace_str()])
        .assert()
        .failure();
}

#[test]
fn showing_an_unknown_task_id_is_a_clean_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["task", "show", "TSK-999999", "--workspace", fx.workspace_str()])
        .assert()
        .failure();
}
