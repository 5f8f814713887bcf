//! Integration tests for the `apcups` CLI binary.
//!
//! These tests validate argument parsing, help output, the offline
//! sensor catalog, and error handling -- all without requiring a live
//! UPS.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `apcups` binary with env isolation.
///
/// Clears all `APCUPS_*` env vars so tests never pick up a real UPS
/// from the developer's environment.
fn apcups_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("apcups");
    cmd.env_remove("APCUPS_HOST")
        .env_remove("APCUPS_PORT")
        .env_remove("APCUPS_TIMEOUT")
        .env_remove("APCUPS_COMMUNITY")
        .env_remove("APCUPS_USERNAME")
        .env_remove("APCUPS_AUTH_PROTOCOL")
        .env_remove("APCUPS_AUTH_PASSPHRASE")
        .env_remove("APCUPS_PRIV_PROTOCOL")
        .env_remove("APCUPS_PRIV_PASSPHRASE")
        .env_remove("APCUPS_OUTPUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = apcups_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    apcups_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("APC UPS")
            .and(predicate::str::contains("test"))
            .and(predicate::str::contains("identity"))
            .and(predicate::str::contains("data"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    apcups_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apcups"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = apcups_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_missing_host_is_a_usage_error() {
    let output = apcups_cmd().arg("test").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("host"),
        "Expected error mentioning the missing host:\n{text}"
    );
}

#[test]
fn test_invalid_host_is_rejected() {
    let output = apcups_cmd()
        .args(["--host", "bad_host!", "test"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
}

#[test]
fn test_invalid_output_format() {
    let output = apcups_cmd()
        .args(["--output", "invalid", "sensors"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_unknown_sensor_key_fails_before_any_network_io() {
    let output = apcups_cmd()
        .args(["--host", "192.0.2.1", "data", "--sensors", "bogus"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("bogus"),
        "Expected error naming the unknown sensor:\n{text}"
    );
}

#[test]
fn test_privacy_without_auth_is_rejected() {
    let output = apcups_cmd()
        .args([
            "--host",
            "192.0.2.1",
            "--username",
            "monitor",
            "--priv-passphrase",
            "secret",
            "test",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("privacy") || text.contains("authentication"),
        "Expected error about privacy without auth:\n{text}"
    );
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_sensors_lists_the_catalog() {
    apcups_cmd().arg("sensors").assert().success().stdout(
        predicate::str::contains("battery_capacity")
            .and(predicate::str::contains("ups_status"))
            .and(predicate::str::contains("on_battery")),
    );
}

#[test]
fn test_sensors_plain_output_is_one_key_per_line() {
    let output = apcups_cmd()
        .args(["--output", "plain", "sensors"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let keys: Vec<&str> = stdout.lines().collect();
    // 14 sensors + 3 binary indicators
    assert_eq!(keys.len(), 17, "Expected 17 catalog keys:\n{stdout}");
    assert!(keys.contains(&"battery_runtime"));
    assert!(keys.contains(&"replace_battery"));
}

#[test]
fn test_sensors_json_output_parses() {
    let output = apcups_cmd()
        .args(["--output", "json", "sensors"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 17);
    assert!(
        entries
            .iter()
            .any(|e| e["key"] == "battery_capacity" && e["unit"] == "%" && e["default"] == true)
    );
}
