//! Shared fixtures for the black-box CLI specs: each test gets its own
//! storage root and workspace directory, and drives the real `tenazas`
//! binary exactly as a user would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::Command;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

pub struct Fixture {
    pub storage: TempDir,
    pub workspace: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            storage: tempfile::tempdir().expect("tempdir"),
            workspace: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// A `tenazas` invocation pre-wired to this fixture's storage root.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tenazas").expect("find tenazas binary");
        cmd.env("TENAZAS_STORAGE_DIR", self.storage.path());
        cmd
    }

    pub fn workspace_str(&self) -> &str {
        self.workspace.path().to_str().expect("utf8 path")
    }

    /// Writes `<storage>/skills/<name>/skill.json` with a single `tool`
    /// state running `command`, optionally routing on failure.
    pub fn write_tool_skill(&self, name: &str, command: &str, on_fail_route: Option<&str>) {
        let mut states = serde_json::Map::new();
        states.insert(
            "t".to_string(),
            json!({
                "type": "tool",
                "command": command,
                "next": "e",
                "on_fail_route": on_fail_route,
            }),
        );
        states.insert("e".to_string(), json!({"type": "end"}));
        if on_fail_route.is_some() {
            states.insert("h".to_string(), json!({"type": "end"}));
        }
        self.write_skill_states(name, states);
    }

    /// Writes a trivial single-`end`-state skill.
    pub fn write_end_skill(&self, name: &str) {
        let mut states = serde_json::Map::new();
        states.insert("s".to_string(), json!({"type": "end"}));
        self.write_skill_states(name, states);
    }

    fn write_skill_states(&self, name: &str, states: serde_json::Map<String, serde_json::Value>) {
        let initial = if states.contains_key("t") { "t" } else { "s" };
        let skill = json!({
            "name": name,
            "base_dir": "",
            "initial_state": initial,
            "states": states,
        });
        let dir = self.storage.path().join("skills").join(name);
        std::fs::create_dir_all(&dir).expect("mkdir skill dir");
        std::fs::write(
            dir.join("skill.json"),
            serde_json::to_vec_pretty(&skill).expect("serialize skill"),
        )
        .expect("write skill.json");
    }

    pub fn write_heartbeat(&self, name: &str, workspace: &Path, skills: &[&str]) {
        let def = json!({
            "name": name,
            "interval": "*/5 * * * *",
            "workspace": workspace,
            "skills": skills,
        });
        std::fs::create_dir_all(self.storage.path().join("heartbeats")).expect("mkdir heartbeats");
        std::fs::write(
            self.storage.path().join("heartbeats").join(format!("{name}.json")),
            serde_json::to_vec_pretty(&def).expect("serialize heartbeat def"),
        )
        .expect("write heartbeat def");
    }
}

pub fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
