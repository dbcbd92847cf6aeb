use std::path::PathBuf;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_chain_cli")
}

fn scenario(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn fight_command_emits_json() {
    let output = Command::new(bin())
        .args(["fight", &scenario("warrior_brutality.toml"), "--json"])
        .output()
        .expect("fight should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("fight should emit json");
    assert_eq!(payload["outcome"], "WIN");
    assert_eq!(payload["fingerprint"].as_str().map(str::len), Some(64));
    assert!(payload["samples"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn fight_command_prints_summary() {
    let output = Command::new(bin())
        .args(["fight", &scenario("warrior_brutality.toml")])
        .output()
        .expect("fight should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Brutal Warrior: WIN"));
    assert!(stdout.contains("fingerprint"));
}

#[test]
fn chain_command_lists_every_node() {
    let output = Command::new(bin())
        .args(["chain", &scenario("sorceress_chain.toml"), "--health", "0.2", "--json"])
        .output()
        .expect("chain should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("chain should emit json");
    assert_eq!(payload["node_log"].as_array().map(Vec::len), Some(4));
    assert!(payload["total_dps"].as_f64().is_some_and(|dps| dps > 0.0));
}

#[test]
fn compare_command_picks_a_side() {
    let output = Command::new(bin())
        .args([
            "compare",
            &scenario("warrior_brutality.toml"),
            &scenario("warrior_plain.toml"),
            "--json",
        ])
        .output()
        .expect("compare should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("compare should emit json");
    assert_eq!(payload["preferred"], "A");
    assert!(payload["dps_delta"].as_f64().is_some_and(|d| d < 0.0));
}

#[test]
fn catalog_command_lists_ids() {
    let output = Command::new(bin())
        .arg("catalog")
        .output()
        .expect("catalog should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("heavy_strike"));
    assert!(stdout.contains("training_dummy"));
}

#[test]
fn missing_scenario_fails() {
    let output = Command::new(bin())
        .args(["fight", "no_such_scenario.toml"])
        .output()
        .expect("fight should run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_command_prints_usage() {
    let output = Command::new(bin())
        .arg("teleport")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: chain_cli"));
}
