use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskquest-{nanos}-{file_name}"))
}

fn task(id: &str, is_completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": id,
        "is_completed": is_completed,
        "priority": "medium",
        "due_by": "2025-12-20T00:00:00Z",
        "created_at": "2025-12-01T00:00:00Z",
        "completed_at": if is_completed { Some("2025-12-10T08:00:00Z") } else { None }
    })
}

fn write_store(path: &Path, tasks: Vec<serde_json::Value>, xp: u32, tasks_completed: u32) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks,
        "user": {
            "id": "user-1",
            "name": "Player",
            "created_at": "2025-12-01T00:00:00Z",
            "level": 1,
            "xp": xp,
            "tasks_completed": tasks_completed
        },
        "challenges": []
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskquest");
    Command::new(exe)
        .args(args)
        .env("TASKQUEST_STORE_PATH", store_path)
        .env("TASKQUEST_CONFIG_PATH", temp_path("absent-config.json"))
        .output()
        .expect("failed to run toggle command")
}

fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn toggle_completes_and_awards_xp() {
    let store_path = temp_path("cli-toggle.json");
    write_store(&store_path, vec![task("task-1", false)], 10, 0);

    let output = run(&store_path, &["toggle", "task-1"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed task: task-1"));
    assert_eq!(stored["tasks"][0]["is_completed"], true);
    assert!(stored["tasks"][0]["completed_at"].is_string());
    assert_eq!(stored["user"]["xp"], 15);
    assert_eq!(stored["user"]["tasks_completed"], 1);
}

#[test]
fn toggle_twice_restores_progress() {
    let store_path = temp_path("cli-toggle-twice.json");
    write_store(&store_path, vec![task("task-1", false)], 10, 0);

    let first = run(&store_path, &["toggle", "task-1"]);
    let second = run(&store_path, &["toggle", "task-1"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(first.status.success());
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Reopened task: task-1"));
    assert_eq!(stored["tasks"][0]["is_completed"], false);
    assert!(stored["tasks"][0]["completed_at"].is_null());
    assert_eq!(stored["user"]["xp"], 10);
    assert_eq!(stored["user"]["tasks_completed"], 0);
}

#[test]
fn reopening_at_task_limit_is_refused() {
    let store_path = temp_path("cli-toggle-limit.json");
    let mut tasks: Vec<serde_json::Value> = (0..10)
        .map(|index| task(&format!("open-{index}"), false))
        .collect();
    tasks.push(task("done", true));
    write_store(&store_path, tasks, 40, 1);
    let before = std::fs::read_to_string(&store_path).unwrap();

    let output = run(&store_path, &["toggle", "done"]);
    let after = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: capacity - task limit reached"));
    assert_eq!(before, after);
}

#[test]
fn raised_task_limit_allows_reopening() {
    let store_path = temp_path("cli-toggle-override.json");
    let mut tasks: Vec<serde_json::Value> = (0..10)
        .map(|index| task(&format!("open-{index}"), false))
        .collect();
    tasks.push(task("done", true));
    write_store(&store_path, tasks, 40, 1);

    let output = run(
        &store_path,
        &["toggle", "done", "--config-override", "max_active_tasks=11"],
    );
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(stored["tasks"][10]["is_completed"], false);
    assert_eq!(stored["user"]["xp"], 35);
    assert_eq!(stored["user"]["tasks_completed"], 0);
}

#[test]
fn toggle_reports_missing_task() {
    let store_path = temp_path("cli-toggle-missing.json");
    write_store(&store_path, Vec::new(), 0, 0);

    let output = run(&store_path, &["toggle", "task-9"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn delete_removes_task() {
    let store_path = temp_path("cli-delete.json");
    write_store(
        &store_path,
        vec![task("task-1", false), task("task-2", false)],
        0,
        0,
    );

    let output = run(&store_path, &["delete", "task-1"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let tasks = stored["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], "task-2");
}
