// SPDX-License-Identifier: MIT

//! Instruction resolution and feedback-prompt assembly for the action-loop
//! subprotocol.

use crate::error::EngineError;
use tenazas_adapters::ShellResult;
use tenazas_core::{SkillGraph, RESUME_SENTINEL};

const SESSION_CONTEXT_HEADER: &str = "### SESSION CONTEXT:";
const FEEDBACK_HEADER: &str = "### FEEDBACK FROM PREVIOUS ATTEMPT:";
const DEFAULT_ON_FAIL_TEMPLATE: &str =
    "Verification failed with exit code {{exit_code}}:\n{{output}}";

/// Resolve a state's `instruction` field: `@relative/path` reads the file
/// from the skill's base directory and strips a leading YAML front-matter
/// block; anything else is returned as-is.
pub fn resolve_instruction(skill: &SkillGraph, instruction: &str) -> Result<String, EngineError> {
    let Some(relative) = instruction.strip_prefix('@') else {
        return Ok(instruction.to_string());
    };
    let path = skill.base_dir.join(relative);
    let raw = std::fs::read_to_string(&path).map_err(tenazas_storage::StorageError::Io)?;
    Ok(strip_yaml_front_matter(&raw))
}

/// Strip a leading `---\n...\n---\n` YAML front-matter block, if present.
fn strip_yaml_front_matter(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix("---\n") else {
        return raw.to_string();
    };
    match rest.find("\n---\n") {
        Some(end) => rest[end + "\n---\n".len()..].to_string(),
        None => raw.to_string(),
    }
}

/// Build the prompt for an action-loop iteration from the resolved
/// instruction and the session's `pending_feedback`.
pub fn build_prompt(instruction: &str, pending_feedback: &str) -> String {
    if pending_feedback.is_empty() {
        return instruction.to_string();
    }
    if pending_feedback == RESUME_SENTINEL {
        return format!("{instruction}\n\n{SESSION_CONTEXT_HEADER}\n{pending_feedback}");
    }
    format!("{instruction}\n\n{FEEDBACK_HEADER}\n{pending_feedback}")
}

/// Render `on_fail_prompt` (or a built-in default) by substituting
/// `{{exit_code}}`, `{{output}}`, `{{stdout}}`, `{{stderr}}` placeholders.
/// The Shell Runner only ever captures combined output, so
/// `{{stdout}}`/`{{stderr}}` both resolve to that same combined text.
pub fn render_fail_feedback(template: Option<&str>, result: &ShellResult) -> String {
    let template = template.unwrap_or(DEFAULT_ON_FAIL_TEMPLATE);
    template
        .replace("{{exit_code}}", &result.exit_code.to_string())
        .replace("{{output}}", &result.output)
        .replace("{{stdout}}", &result.output)
        .replace("{{stderr}}", &result.output)
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
