use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const KEY_VARS: [&str; 5] = [
    "CALENDARIFIC_API_KEY",
    "DISCORD_BOT_TOKEN",
    "GEMINI_API_KEY",
    "PEXELS_API_KEY",
    "RUST_LOG",
];

fn command_in(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("festival-notifier");
    cmd.current_dir(dir.path());
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    command_in(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("settings_path"));
    assert!(content.contains("timezone = \"Asia/Kolkata\""));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# mine\n").expect("write config");

    command_in(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).expect("read"), "# mine\n");
}

#[test]
fn destination_settings_persist_between_invocations() {
    let dir = TempDir::new().expect("temp dir");

    command_in(&dir)
        .args(["destination", "set-categories", "--guild", "42", "hindu, christian"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Categories set to: hindu, christian."));

    command_in(&dir)
        .args(["destination", "set-major-only", "--guild", "42", "true"])
        .assert()
        .success();

    command_in(&dir)
        .args(["destination", "show", "--guild", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Categories: hindu, christian"))
        .stdout(predicate::str::contains("Major festivals only: yes"));

    let saved = fs::read_to_string(dir.path().join("settings.json")).expect("settings file");
    let value: Value = serde_json::from_str(&saved).expect("valid json");
    assert!(value.get("42").is_some());
}

#[test]
fn destination_rejects_unknown_mention_style() {
    let dir = TempDir::new().expect("temp dir");

    command_in(&dir)
        .args(["destination", "set-mention", "--guild", "42", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("everyone, here, none"));

    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn destination_rejects_voice_channel() {
    let dir = TempDir::new().expect("temp dir");

    command_in(&dir)
        .args([
            "destination",
            "set-channel",
            "--guild",
            "42",
            "--channel",
            "7",
            "--kind",
            "voice",
            "--name",
            "lounge",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("#lounge is not a text channel"));
}

#[test]
fn destination_definitions_outputs_valid_json() {
    let dir = TempDir::new().expect("temp dir");

    let output = command_in(&dir)
        .args(["destination", "definitions"])
        .output()
        .expect("run definitions");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let names: Vec<&str> = value
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec!["setchannel", "setcategories", "setmention", "majoronly"]
    );
}

#[test]
fn doctor_warns_without_keys() {
    let dir = TempDir::new().expect("temp dir");

    let output = command_in(&dir)
        .env("FESTIVAL_NOTIFIER__LLM__PROVIDER", "stub")
        .env("FESTIVAL_NOTIFIER__IMAGES__PROVIDER", "none")
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["overall"], "warn");
    assert_eq!(value["schedule"]["status"], "ok");
    assert_eq!(value["discord"]["status"], "warn");
}

#[test]
fn doctor_fails_on_unknown_timezone() {
    let dir = TempDir::new().expect("temp dir");

    command_in(&dir)
        .env("FESTIVAL_NOTIFIER__GENERAL__TIMEZONE", "Mars/Olympus_Mons")
        .args(["doctor"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid timezone"));
}

#[test]
fn run_without_discord_token_fails() {
    let dir = TempDir::new().expect("temp dir");

    command_in(&dir)
        .args(["run", "--once", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DISCORD_BOT_TOKEN"));
}
