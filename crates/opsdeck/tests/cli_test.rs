//! Integration tests for the `opsdeck` CLI binary.
//!
//! These run against the built-in demo data or a workspace file in a temp
//! directory; no PBX, router or SMTP server is needed.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `opsdeck` binary with env isolation.
///
/// Clears all `OPSDECK_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn opsdeck_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("opsdeck");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("OPSDECK_PROFILE")
        .env_remove("OPSDECK_STATE")
        .env_remove("OPSDECK_OUTPUT")
        .env_remove("OPSDECK_TIMEOUT")
        .env_remove("OPSDECK_DEVICE_PASSWORD")
        .env_remove("OPSDECK_USER_PASSWORD");
    cmd
}

/// A scratch home plus a workspace path inside it.
fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("workspace.json");
    (dir, state)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("IVR")
            .and(predicate::str::contains("menus"))
            .and(predicate::str::contains("settings"))
            .and(predicate::str::contains("alerts")),
    );
}

#[test]
fn test_version_flag() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("opsdeck"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_menu_is_not_found() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["menus", "get", "99"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("menus list"));
}

#[test]
fn test_out_of_range_vlan_is_usage_error() {
    let (dir, state) = scratch();
    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["vlans", "create", "--vlan-id", "5000", "--name", "lab"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!state.exists(), "a rejected create must not write the workspace");
}

#[test]
fn test_hangup_needs_yes_without_terminal() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["calls", "hangup", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn test_backup_without_focused_router_fails() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["backups", "create"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Menus ───────────────────────────────────────────────────────────

#[test]
fn test_menus_list_json() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["menus", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let menus = json_stdout(&output);
    assert_eq!(menus.as_array().unwrap().len(), 1);
    assert_eq!(menus[0]["name"], "Main Menu");
    assert_eq!(menus[0]["options"].as_array().unwrap().len(), 3);
}

#[test]
fn test_menus_export_to_stdout() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["menus", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SIP/").and(predicate::str::contains("def play_menu")));
}

#[test]
fn test_menus_export_to_file() {
    let (dir, _) = scratch();
    let script = dir.path().join("ivr_handler.py");
    opsdeck_cmd(dir.path())
        .args(["menus", "export", "-f"])
        .arg(&script)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));
    assert!(std::fs::read_to_string(&script).unwrap().contains("Main Menu"));
}

#[test]
fn test_dangling_submenu_blocks_export() {
    let (dir, state) = scratch();
    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["menus", "add-option", "--key", "9", "--label", "Nowhere"])
        .args(["--action", "menu", "--target", "42"])
        .assert()
        .success();

    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["menus", "export"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("42"));

    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["menus", "validate"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("unknown menu '42'"));
}

#[test]
fn test_menu_edits_persist_in_workspace() {
    let (dir, state) = scratch();
    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["menus", "add", "--name", "After Hours", "--digit-timeout", "8"])
        .assert()
        .success();

    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["menus", "list", "-o", "json"])
        .output()
        .unwrap();
    let menus = json_stdout(&output);
    let names: Vec<&str> = menus
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Main Menu", "After Hours"]);
    assert_eq!(menus[1]["timeout"], 8);
}

#[test]
fn test_changes_without_state_are_not_saved() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["alerts", "ack", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not saved"));
}

// ── Settings ────────────────────────────────────────────────────────

#[test]
fn test_manager_conf_redacts_secret_by_default() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["settings", "manager-conf"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[general]")
                .and(predicate::str::contains("secret = <redacted>")),
        );
}

#[test]
fn test_settings_show_json_masks_secrets() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["settings", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v = json_stdout(&output);
    assert_eq!(v["asterisk"]["port"], 5038);
    assert_eq!(v["asterisk"]["secret"], "(not set)");
}

#[test]
fn test_unknown_explicit_profile() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["-p", "nope", "settings", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ── Calls & analytics ───────────────────────────────────────────────

#[test]
fn test_transfer_persists() {
    let (dir, state) = scratch();
    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["calls", "transfer", "2"])
        .assert()
        .success();

    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["calls", "list", "-o", "json"])
        .output()
        .unwrap();
    let calls = json_stdout(&output);
    let call = calls
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == "2")
        .unwrap();
    assert_eq!(call["status"], "transferred");
}

#[test]
fn test_calls_watch_stops_after_updates() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["calls", "watch", "-n", "1", "-o", "plain"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n2\n3"));
}

#[test]
fn test_analytics_report_csv() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["analytics", "report"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Date,Total Calls,Answered,Abandoned,Avg Duration",
        ));
}

// ── Network portal ──────────────────────────────────────────────────

#[test]
fn test_vlan_create_persists() {
    let (dir, state) = scratch();
    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["vlans", "create", "--vlan-id", "300", "--name", "Lab"])
        .assert()
        .success();

    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["vlans", "list", "-o", "json"])
        .output()
        .unwrap();
    let vlans = json_stdout(&output);
    let created = vlans
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["vlan_id"] == 300)
        .unwrap();
    assert_eq!(created["interface"], "bridge");
    assert_eq!(created["status"], "active");
}

#[test]
fn test_backup_of_selected_router() {
    let (dir, state) = scratch();
    let devices = opsdeck_cmd(dir.path())
        .args(["devices", "list", "-o", "json"])
        .output()
        .unwrap();
    let name = json_stdout(&devices)[0]["name"].as_str().unwrap().to_owned();

    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["devices", "select", &name])
        .assert()
        .success();
    opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["backups", "create", "--name", "nightly"])
        .assert()
        .success();

    let output = opsdeck_cmd(dir.path())
        .arg("--state")
        .arg(&state)
        .args(["backups", "list", "-o", "json"])
        .output()
        .unwrap();
    let backups = json_stdout(&output);
    let nightly = backups
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["name"] == "nightly")
        .unwrap();
    assert_eq!(nightly["device"], name.as_str());
    assert_eq!(nightly["kind"], "manual");
}

#[test]
fn test_alert_filters() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["alerts", "list", "--status", "active", "-o", "json"])
        .output()
        .unwrap();
    let alerts = json_stdout(&output);
    assert_eq!(alerts.as_array().unwrap().len(), 3);
    assert!(
        alerts
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["status"] == "active")
    );
}

#[test]
fn test_user_requires_password() {
    let (dir, _) = scratch();
    let output = opsdeck_cmd(dir.path())
        .args(["users", "create", "--username", "dana", "--email", "dana@example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("password"));
}

// ── E-mail settings ─────────────────────────────────────────────────

#[test]
fn test_email_recipients_persist() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["email", "add-recipient", "noc@example.com"])
        .assert()
        .success();
    opsdeck_cmd(dir.path())
        .args(["email", "add-recipient", "noc@example.com"])
        .assert()
        .code(2);

    let output = opsdeck_cmd(dir.path())
        .args(["email", "show", "-o", "json"])
        .output()
        .unwrap();
    let cfg = json_stdout(&output);
    assert_eq!(cfg["to_emails"], serde_json::json!(["noc@example.com"]));
    assert_eq!(cfg["smtp_port"], 587);
}

#[test]
fn test_email_preview_substitutes_placeholders() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["email", "preview", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Subject: [MikroTik Alert]")
                .and(predicate::str::contains("{device_name}").not()),
        );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_and_show() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["config", "set", "agi.port", "4600"])
        .assert()
        .success();
    opsdeck_cmd(dir.path())
        .args(["config", "set", "secret", "hunter2"])
        .assert()
        .success();

    opsdeck_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("port = 4600")
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("****")),
        );
}

#[test]
fn test_config_set_rejects_bad_sample_rate() {
    let (dir, _) = scratch();
    opsdeck_cmd(dir.path())
        .args(["config", "set", "audio.sample_rate", "22050"])
        .assert()
        .code(2);
}
