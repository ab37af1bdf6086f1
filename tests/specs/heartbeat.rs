//! Black-box coverage of `tenazas heartbeat tick <name>` (spec.md §4.7),
//! driven through the CLI rather than the daemon's own tick loop.

use crate::prelude::{stdout_of, Fixture};

#[test]
fn ticking_starts_the_next_ready_task_and_runs_it_to_completion() {
    let fx = Fixture::new();
    fx.write_end_skill("triage");
    fx.write_heartbeat("nightly", fx.workspace.path(), &["triage"]);

    let add = fx
        .cmd()
        .args(["task", "add", "ready work", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    assert!(add.status.success());
    let id = stdout_of(&add)
        .trim()
        .strip_prefix("created ")
        .expect("created <id> line")
        .to_string();

    fx.cmd()
        .args(["heartbeat", "tick", "nightly"])
        .assert()
        .success();

    let show = fx
        .cmd()
        .args(["task", "show", &id, "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");
    let show_out = stdout_of(&show);
    assert!(show_out.contains("status: InProgress"));
}

#[test]
fn ticking_an_unknown_heartbeat_name_is_a_clean_error() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["heartbeat", "tick", "does-not-exist"])
        .assert()
        .failure();
}
