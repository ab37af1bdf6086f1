use super::*;
use std::collections::HashMap;
use tempfile::tempdir;

fn skill_with_base_dir(base_dir: std::path::PathBuf) -> SkillGraph {
    SkillGraph {
        name: "s".to_string(),
        base_dir,
        initial_state: "start".to_string(),
        max_loops: None,
        max_budget_usd: None,
        states: HashMap::new(),
    }
}

#[test]
fn inline_instruction_passes_through_unchanged() {
    let skill = skill_with_base_dir(std::path::PathBuf::from("/nonexistent"));
    assert_eq!(resolve_instruction(&skill, "do the thing").unwrap(), "do the thing");
}

#[test]
fn at_prefixed_instruction_reads_file_relative_to_base_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("step.md"), "run the plan").unwrap();
    let skill = skill_with_base_dir(dir.path().to_path_buf());
    assert_eq!(resolve_instruction(&skill, "@step.md").unwrap(), "run the plan");
}

#[test]
fn at_prefixed_instruction_strips_yaml_front_matter() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("step.md"),
        "---\ntitle: step one\n---\nrun the plan",
    )
    .unwrap();
    let skill = skill_with_base_dir(dir.path().to_path_buf());
    assert_eq!(resolve_instruction(&skill, "@step.md").unwrap(), "run the plan");
}

#[test]
fn missing_referenced_file_surfaces_as_io_error() {
    let dir = tempdir().unwrap();
    let skill = skill_with_base_dir(dir.path().to_path_buf());
    assert!(resolve_instruction(&skill, "@missing.md").is_err());
}

#[test]
fn empty_feedback_yields_bare_instruction() {
    assert_eq!(build_prompt("go", ""), "go");
}

#[test]
fn resume_sentinel_gets_session_context_header() {
    let prompt = build_prompt("go", RESUME_SENTINEL);
    assert!(prompt.contains("### SESSION CONTEXT:"));
    assert!(prompt.contains(RESUME_SENTINEL));
}

#[test]
fn other_feedback_gets_feedback_header() {
    let prompt = build_prompt("go", "it broke");
    assert!(prompt.contains("### FEEDBACK FROM PREVIOUS ATTEMPT:"));
    assert!(prompt.contains("it broke"));
}

#[test]
fn default_fail_template_substitutes_exit_code_and_output() {
    let result = ShellResult { exit_code: 1, output: "boom".to_string() };
    let feedback = render_fail_feedback(None, &result);
    assert!(feedback.contains('1'));
    assert!(feedback.contains("boom"));
}

#[test]
fn custom_fail_template_substitutes_every_placeholder() {
    let result = ShellResult { exit_code: 2, output: "out".to_string() };
    let template = "code={{exit_code}} out={{output}} stdout={{stdout}} stderr={{stderr}}";
    let feedback = render_fail_feedback(Some(template), &result);
    assert_eq!(feedback, "code=2 out=out stdout=out stderr=out");
}
