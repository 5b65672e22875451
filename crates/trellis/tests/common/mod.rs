//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

const CREATED_AT: &str = "2026-01-05T10:00:00Z";

/// Run the trellis binary in the specified directory, with colors off
pub fn run_trellis_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("TRELLIS_ASCII")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute trellis binary")
}

/// Stdout of a run as a string
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a run as a string
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A project record line
pub fn project_json(id: &str, number: u32, name: &str) -> String {
    format!(
        r#"{{"kind":"project","id":"{id}","number":{number},"name":"{name}","created_at":"{CREATED_AT}"}}"#
    )
}

/// An epic record line
pub fn epic_json(id: &str, project_id: &str, number: u32, name: &str) -> String {
    format!(
        r#"{{"kind":"epic","id":"{id}","project_id":"{project_id}","number":{number},"name":"{name}","sort_order":{number}}}"#
    )
}

/// An issue record line
pub fn issue_json(
    id: &str,
    project_id: &str,
    epic_id: &str,
    number: u32,
    status: &str,
    story_points: Option<u32>,
) -> String {
    let points = story_points
        .map(|points| format!(r#","story_points":{points}"#))
        .unwrap_or_default();
    format!(
        r#"{{"kind":"issue","id":"{id}","project_id":"{project_id}","epic_id":"{epic_id}","number":{number},"title":"Issue {id}","status":"{status}","priority":2{points},"created_at":"{CREATED_AT}"}}"#
    )
}

/// A sub-issue record line
pub fn sub_issue_json(id: &str, project_id: &str, epic_id: &str, number: u32, parent: &str) -> String {
    format!(
        r#"{{"kind":"issue","id":"{id}","project_id":"{project_id}","epic_id":"{epic_id}","number":{number},"title":"Issue {id}","status":"todo","priority":2,"parent_issue_id":"{parent}","created_at":"{CREATED_AT}"}}"#
    )
}

/// A dependency record line
pub fn dependency_json(issue_id: &str, depends_on_id: &str) -> String {
    format!(r#"{{"kind":"dependency","issue_id":"{issue_id}","depends_on_id":"{depends_on_id}"}}"#)
}

/// Overwrite the snapshot of an initialized repository
pub fn write_snapshot(dir: &Path, lines: &[String]) {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(dir.join(".trellis").join("snapshot.jsonl"), content)
        .expect("Failed to write snapshot");
}

/// Read back the snapshot of an initialized repository
pub fn read_snapshot(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(".trellis").join("snapshot.jsonl"))
        .expect("Failed to read snapshot")
}
