use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn successful_command_returns_exit_zero_and_stdout() {
    let dir = tempdir().unwrap();
    let result = run_shell(dir.path(), "echo hi").await;
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output.trim(), "hi");
}

#[tokio::test]
async fn failing_command_returns_its_exit_code() {
    let dir = tempdir().unwrap();
    let result = run_shell(dir.path(), "exit 7").await;
    assert_eq!(result.exit_code, 7);
}

#[tokio::test]
async fn runs_in_the_given_workspace() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), b"x").unwrap();
    let result = run_shell(dir.path(), "ls").await;
    assert!(result.output.contains("marker.txt"));
}

#[tokio::test]
async fn timeout_reports_exit_124_with_fixed_marker() {
    let dir = tempdir().unwrap();
    let result = run_shell(dir.path(), "sleep 35").await;
    assert_eq!(result.exit_code, 124);
    assert_eq!(result.output, "Command timed out after 30s");
}

#[test]
fn output_under_the_cap_is_not_truncated() {
    let text = "a".repeat(100);
    assert_eq!(truncate(&text), text);
}

#[test]
fn output_over_the_cap_is_truncated_preserving_head_and_tail() {
    let head = "H".repeat(1000);
    let middle = "M".repeat(100_000);
    let tail = "T".repeat(2000);
    let text = format!("{head}{middle}{tail}");

    let truncated = truncate(&text);
    assert!(truncated.len() <= MAX_OUTPUT_BYTES);
    assert!(truncated.starts_with(&head));
    assert!(truncated.ends_with(&tail));
    assert!(truncated.contains("...[TRUNCATED]..."));
}
