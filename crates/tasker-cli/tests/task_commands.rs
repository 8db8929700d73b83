//! Integration tests for `tasker tasks` and `tasker shell` against local storage.


use std::fs;

use predicates::prelude::*;
use tempfile::TempDir;

use fixtures::{LOCAL_CONFIG, first_task_id, signed_in_home, tasker};

#[test]
fn test_tasks_require_login() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), LOCAL_CONFIG).unwrap();

    tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_remote_mode_without_url_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[storage]\nmode = \"remote\"\n").unwrap();

    tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task API URL not configured"));
}

#[test]
fn test_empty_list() {
    let dir = signed_in_home();

    tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada <ada@example.com>"))
        .stdout(predicate::str::contains("0 total • 0 pending • 0 completed"))
        .stdout(predicate::str::contains("No tasks yet. Add one to get started!"));
}

#[test]
fn test_task_lifecycle() {
    let dir = signed_in_home();

    tasker(dir.path())
        .args([
            "tasks",
            "add",
            "Buy milk",
            "--priority",
            "high",
            "--deadline",
            "2030-03-05",
            "--description",
            "oat",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Task created successfully!"));

    let listed = tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[HIGH] Buy milk  ○ Pending"))
        .stdout(predicate::str::contains("    oat"))
        .stdout(predicate::str::contains("Due Mar 5, 2030"))
        .stdout(predicate::str::contains("1 total • 1 pending • 0 completed"));
    let id = first_task_id(&listed.get_output().stdout);

    tasker(dir.path())
        .args(["tasks", "edit", id.as_str(), "--name", "Buy oat milk", "--deadline", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task updated successfully!"));

    tasker(dir.path())
        .args(["tasks", "complete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task marked as completed!"));

    tasker(dir.path())
        .args(["tasks", "list", "--filter", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[HIGH] Buy oat milk  ✓ Completed"))
        .stdout(predicate::str::contains("Due No deadline"))
        .stdout(predicate::str::contains("Filter: all pending [completed]"));

    tasker(dir.path())
        .args(["tasks", "delete", id.as_str(), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task deleted successfully!"));

    tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 total"));
}

#[test]
fn test_tasks_are_stored_per_user() {
    let dir = signed_in_home();

    tasker(dir.path())
        .args(["tasks", "add", "Write report"])
        .assert()
        .success();

    let stored = fs::read_to_string(dir.path().join("tasks").join("tasks_ada%40example.com.json"))
        .unwrap();
    assert!(stored.contains("\"task_name\": \"Write report\""));
}

#[test]
fn test_delete_declined_keeps_task() {
    let dir = signed_in_home();
    tasker(dir.path())
        .args(["tasks", "add", "Keep me"])
        .assert()
        .success();
    let listed = tasker(dir.path()).args(["tasks", "list"]).assert().success();
    let id = first_task_id(&listed.get_output().stdout);

    tasker(dir.path())
        .args(["tasks", "delete", id.as_str()])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Are you sure you want to delete this task?",
        ))
        .stdout(predicate::str::contains("Cancelled."));

    tasker(dir.path())
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep me"));
}

#[test]
fn test_add_rejects_bad_input_before_storage() {
    let dir = signed_in_home();

    tasker(dir.path())
        .args(["tasks", "add", "x", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown priority"));

    tasker(dir.path())
        .args(["tasks", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a task name"));

    assert!(!dir.path().join("tasks").join("tasks_ada%40example.com.json").exists());
}

#[test]
fn test_complete_unknown_task_fails() {
    let dir = signed_in_home();

    tasker(dir.path())
        .args(["tasks", "complete", "task_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to update task"));
}

#[test]
fn test_list_sorted_by_name() {
    let dir = signed_in_home();
    for name in ["banana", "Apple", "cherry"] {
        tasker(dir.path())
            .args(["tasks", "add", name])
            .assert()
            .success();
    }

    let listed = tasker(dir.path())
        .args(["tasks", "list", "--sort", "name"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&listed.get_output().stdout).to_string();
    let apple = stdout.find("Apple").unwrap();
    let banana = stdout.find("banana").unwrap();
    let cherry = stdout.find("cherry").unwrap();
    assert!(apple < banana && banana < cherry);
}

#[test]
fn test_shell_runs_gestures_in_order() {
    let dir = signed_in_home();

    tasker(dir.path())
        .arg("shell")
        .write_stdin("add Buy milk\nfilter completed\nbogus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Task created successfully!"))
        .stdout(predicate::str::contains("1 total • 1 pending • 0 completed"))
        .stdout(predicate::str::contains("Filter: all pending [completed]"))
        .stdout(predicate::str::contains("✗ Unknown command: bogus"));
}
