use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "skyhop-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_skyhop-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("score-claim"));
}

#[test]
fn cli_runs_every_scenario_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_skyhop-tester");
    let output_path = temp_path("all.json");
    let output = Command::new(exe)
        .args(["--scenarios", "all", "--report", "json", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skyhop Mission Tester"));

    let content = std::fs::read_to_string(output_path).expect("read report");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = report.as_array().expect("array of results");
    assert!(results.len() >= 9);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_actions_update_the_store_file() {
    let exe = env!("CARGO_BIN_EXE_skyhop-tester");
    let store = temp_path("store.json");
    let first = Command::new(exe)
        .args(["--now", "2024-05-15T12:00", "--value", "reach_score:60", "--claim", "score_50"])
        .arg("--store")
        .arg(&store)
        .args(["--report", "json"])
        .output()
        .expect("run cli");
    assert!(first.status.success());
    let outcome: serde_json::Value =
        serde_json::from_slice(&first.stdout).expect("json outcome");
    assert_eq!(outcome["balance"], 100);
    assert_eq!(outcome["claims"][0]["granted"], true);

    let saved = std::fs::read_to_string(&store).expect("store written");
    assert!(saved.contains("mission_score_50"));
    assert!(saved.contains("currency.balance"));

    let second = Command::new(exe)
        .args(["--now", "2024-05-15T13:00", "--show", "--claim", "score_50"])
        .arg("--store")
        .arg(&store)
        .output()
        .expect("run cli");
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("already claimed"));
    assert!(stdout.contains("Balance: 100"));
    let _ = std::fs::remove_file(store);
}

#[test]
fn cli_rejects_malformed_increment() {
    let exe = env!("CARGO_BIN_EXE_skyhop-tester");
    let output = Command::new(exe)
        .args(["--increment", "play_games"])
        .arg("--store")
        .arg(temp_path("unused.json"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OBJECTIVE:N"));
}
