//! Black-box spec.md §8 scenarios S1-S4, driven through the `tenazas run`
//! subcommand end to end.

use crate::prelude::{stdout_of, Fixture};

#[test]
fn s1_trivial_end_state_completes() {
    let fx = Fixture::new();
    fx.write_end_skill("noop");

    let output = fx
        .cmd()
        .args(["run", "noop", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");

    assert!(output.status.success(), "{}", stdout_of(&output));
    assert!(stdout_of(&output).contains("status: Completed"));
}

#[test]
fn s2_tool_success_then_end() {
    let fx = Fixture::new();
    fx.write_tool_skill("succeed", "true", None);

    let output = fx
        .cmd()
        .args(["run", "succeed", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("status: Completed"));
}

#[test]
fn s3_tool_failure_routed_to_completion() {
    let fx = Fixture::new();
    fx.write_tool_skill("routed", "false", Some("h"));

    let output = fx
        .cmd()
        .args(["run", "routed", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("status: Completed"));
}

#[test]
fn s4_tool_failure_unrouted_fails_the_session() {
    let fx = Fixture::new();
    fx.write_tool_skill("unrouted", "false", None);

    let output = fx
        .cmd()
        .args(["run", "unrouted", "--workspace", fx.workspace_str()])
        .output()
        .expect("run tenazas");

    assert!(output.status.success(), "CLI itself should exit 0 even on a failed session");
    assert!(stdout_of(&output).contains("status: Failed"));
}

#[test]
fn unknown_skill_name_is_a_clean_error_not_a_panic() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["run", "does-not-exist", "--workspace", fx.workspace_str()])
        .assert()
        .failure();
}

#[test]
fn resuming_an_unknown_session_id_is_a_clean_error() {
    let fx = Fixture::new();
    fx.write_end_skill("noop");

    fx.cmd()
        .args([
            "run",
            "noop",
            "--session",
            "nope-not-real",
            "--workspace",
            fx.workspace_str(),
        ])
        .assert()
        .failure();
}
