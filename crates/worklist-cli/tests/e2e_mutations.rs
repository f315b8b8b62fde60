//! E2E mutation tests: optimistic set with rollback, confirmed delete,
//! create, and edit.
//!
//! Remote failures are injected through `WORKLIST_REMOTE_FAIL`, which makes
//! the named file-remote operations fail with a transport error.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn wl_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wl"));
    cmd.current_dir(dir);
    cmd.env("WORKLIST_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("WORKLIST_REMOTE_FAIL");
    cmd
}

fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    let data = json!({
        "projects": [
            { "id": 1, "name": "Cobalt", "status": "completed", "priority": "high" },
            { "id": 2, "name": "Apollo", "status": "active", "priority": "low",
              "due_date": "2024-06-01" },
            { "id": 3, "name": "Borealis", "status": "on_hold", "priority": "medium" },
        ],
        "work_items": [
            { "id": 10, "title": "Write docs", "status": "pending",
              "project": { "id": 2, "name": "Apollo" } },
        ],
        "next_id": 20,
    });
    std::fs::write(
        dir.path().join("worklist.json"),
        serde_json::to_string_pretty(&data).unwrap(),
    )
    .unwrap();
    dir
}

fn data_file(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("worklist.json")).unwrap()
}

fn stored(dir: &Path) -> Value {
    serde_json::from_str(&data_file(dir)).unwrap()
}

fn stored_project(dir: &Path, id: i64) -> Option<Value> {
    stored(dir)["projects"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id)
        .cloned()
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = wl_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

#[test]
fn set_commits_and_reports_the_change() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["projects", "set", "2", "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated project \"Apollo\""))
        .stdout(predicate::str::contains("active"))
        .stdout(predicate::str::contains("completed"));

    let project = stored_project(dir.path(), 2).unwrap();
    assert_eq!(project["status"], "completed");
    assert_eq!(project["priority"], "low");
    assert_eq!(project["due_date"], "2024-06-01");
}

#[test]
fn set_json_carries_outcome_and_entity() {
    let dir = seeded();
    let report = run_json(dir.path(), &["projects", "set", "3", "--priority", "high"]);
    assert_eq!(report["outcome"], "committed");
    assert_eq!(report["entity"]["priority"], "high");
    assert_eq!(report["notices"][0]["event"], "updated");
}

#[test]
fn failed_set_rolls_back_and_leaves_data_untouched() {
    let dir = seeded();
    let before = data_file(dir.path());

    let output = wl_cmd(dir.path())
        .env("WORKLIST_REMOTE_FAIL", "update")
        .args(["projects", "set", "2", "--status", "on_hold", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["outcome"], "rolled_back");
    // The reported entity is the restored one, not the optimistic value.
    assert_eq!(report["entity"]["status"], "active");
    assert_eq!(report["notices"][0]["event"], "failed");
    assert!(String::from_utf8_lossy(&output.stderr).contains("E4001"));

    assert_eq!(data_file(dir.path()), before);
}

#[test]
fn set_rejects_invalid_labels_before_touching_the_remote() {
    let dir = seeded();
    let before = data_file(dir.path());
    wl_cmd(dir.path())
        .args(["projects", "set", "2", "--status", "archived"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2005"));
    wl_cmd(dir.path())
        .args(["items", "set", "10", "--due", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2007"));
    assert_eq!(data_file(dir.path()), before);
}

#[test]
fn json_errors_are_a_single_document_on_stderr() {
    let dir = seeded();
    let output = wl_cmd(dir.path())
        .args(["projects", "set", "2", "--status", "archived", "--json"])
        .output()
        .expect("set should not crash");
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).unwrap_or_else(|e| {
        panic!(
            "stderr is not one JSON document ({e}): {}",
            String::from_utf8_lossy(&output.stderr)
        )
    });
    assert_eq!(err["error"]["error_code"], "E2005");
    assert!(
        err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("archived")
    );
}

#[test]
fn text_errors_are_printed_once() {
    let dir = seeded();
    let output = wl_cmd(dir.path())
        .args(["projects", "set", "99", "--status", "active"])
        .output()
        .expect("set should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("E2001").count(), 1, "stderr: {stderr}");
    assert!(!stderr.contains("Error:"), "stderr: {stderr}");
}

#[test]
fn set_without_fields_is_an_error() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["projects", "set", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2006"));
}

#[test]
fn set_on_unknown_id_fails_without_writing() {
    let dir = seeded();
    let before = data_file(dir.path());
    wl_cmd(dir.path())
        .args(["projects", "set", "99", "--status", "active"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
    assert_eq!(data_file(dir.path()), before);
}

#[test]
fn item_status_uses_work_item_labels() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["items", "set", "10", "--status", "in progress"])
        .assert()
        .success();
    assert_eq!(stored(dir.path())["work_items"][0]["status"], "in_progress");
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[test]
fn delete_removes_the_entity() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["projects", "delete", "2", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted project \"Apollo\""));
    assert!(stored_project(dir.path(), 2).is_none());
    assert!(stored_project(dir.path(), 3).is_some());
}

#[test]
fn failed_delete_keeps_the_entity_and_the_pending_confirmation() {
    let dir = seeded();
    let before = data_file(dir.path());

    let output = wl_cmd(dir.path())
        .env("WORKLIST_REMOTE_FAIL", "delete")
        .args(["projects", "delete", "2", "--force", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["outcome"], "rolled_back");
    assert_eq!(report["pending_delete"], 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("E4001"));

    assert_eq!(data_file(dir.path()), before);
}

#[test]
fn delete_of_unknown_id_is_not_found() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["items", "delete", "99", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

// ---------------------------------------------------------------------------
// create / edit
// ---------------------------------------------------------------------------

#[test]
fn create_project_then_list_it() {
    let dir = seeded();
    let report = run_json(
        dir.path(),
        &["projects", "create", "--name", "Zenith", "--priority", "high"],
    );
    assert_eq!(report["outcome"], "committed");
    assert_eq!(report["entity"]["id"], 20);
    assert_eq!(report["entity"]["status"], "active");

    let listed = run_json(dir.path(), &["projects", "list", "--text", "zen"]);
    assert_eq!(listed[0]["name"], "Zenith");
    assert_eq!(stored(dir.path())["next_id"], 21);
}

#[test]
fn create_item_fills_project_name() {
    let dir = seeded();
    let report = run_json(
        dir.path(),
        &["items", "create", "--title", "Review", "--project", "3"],
    );
    assert_eq!(report["entity"]["project"]["name"], "Borealis");
    assert_eq!(report["entity"]["status"], "pending");
}

#[test]
fn create_item_under_missing_project_is_rejected() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["items", "create", "--title", "Orphan", "--project", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4002"));
}

#[test]
fn failed_create_adds_nothing() {
    let dir = seeded();
    let before = data_file(dir.path());
    wl_cmd(dir.path())
        .env("WORKLIST_REMOTE_FAIL", "create")
        .args(["projects", "create", "--name", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
    assert_eq!(data_file(dir.path()), before);
}

#[test]
fn edit_saves_the_server_normalized_name() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["projects", "edit", "2", "--name", "  Apollo II  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved project \"Apollo II\""));
    assert_eq!(stored_project(dir.path(), 2).unwrap()["name"], "Apollo II");
}

#[test]
fn meeting_link_edit_is_project_only() {
    let dir = seeded();
    wl_cmd(dir.path())
        .args(["items", "edit", "10", "--meeting-link", "https://meet.example/x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("meeting link"));
}

#[test]
fn load_failure_aborts_before_mutating() {
    let dir = seeded();
    wl_cmd(dir.path())
        .env("WORKLIST_REMOTE_FAIL", "fetch")
        .args(["projects", "set", "2", "--status", "completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
    assert_eq!(stored_project(dir.path(), 2).unwrap()["status"], "active");
}
