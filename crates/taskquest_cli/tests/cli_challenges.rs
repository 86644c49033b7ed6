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

fn write_store(path: &Path, content: serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskquest");
    Command::new(exe)
        .args(args)
        .args(["--config-override", "utc_offset_minutes=0"])
        .env("TASKQUEST_STORE_PATH", store_path)
        .env("TASKQUEST_CONFIG_PATH", temp_path("absent-config.json"))
        .output()
        .expect("failed to run taskquest")
}

fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn low_priority_task(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": id,
        "priority": "low",
        "due_by": "2025-12-20T00:00:00Z",
        "created_at": "2025-12-01T00:00:00Z"
    })
}

#[test]
fn challenges_are_generated_once_per_period() {
    let store_path = temp_path("cli-challenges-generate.json");

    let first = run(&store_path, &["challenges", "--json"]);
    let second = run(&store_path, &["challenges", "--json"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(first.status.success());
    assert!(second.status.success());
    let first_json: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&first.stdout).trim()).unwrap();
    let second_json: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&second.stdout).trim()).unwrap();

    assert_eq!(first_json["generated"], 6);
    assert_eq!(second_json["generated"], 0);
    assert_eq!(first_json["challenges"], second_json["challenges"]);
    assert_eq!(stored["challenges"].as_array().map(Vec::len), Some(6));
    assert_eq!(first_json["challenges"][0]["kind"], "daily");
    assert_eq!(first_json["challenges"][5]["kind"], "weekly");
}

#[test]
fn three_completed_tasks_finish_the_daily_challenge() {
    let store_path = temp_path("cli-challenges-complete.json");
    write_store(
        &store_path,
        serde_json::json!({
            "schema_version": 1,
            "tasks": [
                low_priority_task("task-1"),
                low_priority_task("task-2"),
                low_priority_task("task-3")
            ]
        }),
    );

    for id in ["task-1", "task-2", "task-3"] {
        let output = run(&store_path, &["toggle", id]);
        assert!(output.status.success());
    }
    let output = run(&store_path, &["challenges", "--json"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let printed: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let completed = printed["completed"].as_array().expect("completed array");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["title"], "Complete 3 tasks today");
    assert_eq!(completed[0]["current_progress"], 3);

    let bigger = printed["challenges"]
        .as_array()
        .expect("challenges array")
        .iter()
        .find(|challenge| challenge["title"] == "Complete 5 tasks today")
        .expect("five task challenge");
    assert_eq!(bigger["current_progress"], 3);
    assert_eq!(bigger["is_completed"], false);

    assert_eq!(stored["user"]["xp"], 15 + 10);
    assert_eq!(stored["user"]["tasks_completed"], 3);
}

#[test]
fn stale_daily_challenges_are_replaced() {
    let store_path = temp_path("cli-challenges-expire.json");
    write_store(
        &store_path,
        serde_json::json!({
            "schema_version": 1,
            "challenges": [
                {
                    "id": "old-daily",
                    "title": "Complete 3 tasks today",
                    "kind": "daily",
                    "start_date": "2020-01-01T00:00:00Z",
                    "end_date": "2020-01-02T00:00:00Z",
                    "goal": 3,
                    "current_progress": 1,
                    "is_completed": false,
                    "reward_xp": 10
                }
            ]
        }),
    );

    let output = run(&store_path, &["challenges"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let challenges = stored["challenges"].as_array().expect("challenges array");
    assert_eq!(challenges.len(), 6);
    assert!(challenges.iter().all(|challenge| challenge["id"] != "old-daily"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Complete 30 tasks this week"));
}
