//! Integration tests for the `hydrobot` CLI binary.
//!
//! Argument parsing, config management and exit codes, plus a few
//! end-to-end runs against a wiremock camera.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hydrobot` binary with env isolation.
///
/// Clears all `HYDROBOT_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn hydrobot_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hydrobot");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("HYDROBOT_ADDRESS")
        .env_remove("HYDROBOT_SERVER")
        .env_remove("HYDROBOT_OUTPUT")
        .env_remove("HYDROBOT_TIMEOUT")
        .env_remove("HYDROBOT_DEVICE__ADDRESS")
        .env_remove("HYDROBOT_DETECTION__SERVER")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = hydrobot_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("led"))
            .and(predicate::str::contains("pump"))
            .and(predicate::str::contains("detect"))
            .and(predicate::str::contains("stream")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_switch_state() {
    let home = tempfile::tempdir().unwrap();
    let output = hydrobot_cmd(home.path())
        .args(["led", "blink"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

// ── Offline device commands ─────────────────────────────────────────

#[test]
fn test_stream_prints_url_without_network() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path())
        .args(["--address", "192.168.4.9", "stream"])
        .assert()
        .success()
        .stdout("http://192.168.4.9:81/stream\n");
}

#[test]
fn test_scheme_less_server_does_not_block_device_commands() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path())
        .args(["--server", "192.168.4.2:8000", "--address", "192.168.4.9", "stream"])
        .assert()
        .success()
        .stdout("http://192.168.4.9:81/stream\n");

    hydrobot_cmd(home.path())
        .args(["config", "set", "detection.server", "192.168.4.2:8000"])
        .assert()
        .success();
}

#[test]
fn test_unreachable_device_exits_with_connection_code() {
    let home = tempfile::tempdir().unwrap();
    let output = hydrobot_cmd(home.path())
        .args(["--address", "127.0.0.1:9", "--timeout", "2", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("HYDROBOT-CAM"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path())
        .args(["config", "show", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("device.address=192.168.4.1")
                .and(predicate::str::contains("polling.status_interval_ms=5000")),
        );
}

#[test]
fn test_config_init_set_show() {
    let home = tempfile::tempdir().unwrap();

    hydrobot_cmd(home.path()).args(["config", "init"]).assert().success();
    hydrobot_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    hydrobot_cmd(home.path())
        .args(["config", "set", "device.address", "10.0.0.7"])
        .assert()
        .success();

    let output = hydrobot_cmd(home.path())
        .args(["config", "show", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["device"]["address"], "10.0.0.7");

    let output = hydrobot_cmd(home.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = String::from_utf8(output.stdout).unwrap();
    assert!(Path::new(path.trim()).exists());
}

#[test]
fn test_config_set_rejects_unknown_key_and_bad_value() {
    let home = tempfile::tempdir().unwrap();
    hydrobot_cmd(home.path())
        .args(["config", "set", "device.color", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("device.address"));

    hydrobot_cmd(home.path())
        .args(["config", "set", "polling.status_interval_ms", "0"])
        .assert()
        .code(2);
}

// ── Against a mock camera ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_against_mock_device() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "192.168.4.1", "mode": "ap", "led": true, "pump": false
        })))
        .mount(&server)
        .await;

    let mut cmd = hydrobot_cmd(home.path());
    cmd.args(["--address", &server.address().to_string(), "-o", "plain", "status"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "OK \u{2022} ip:192.168.4.1 \u{2022} mode:ap \u{2022} led:on \u{2022} pump:off"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_led_toggle_reads_state_first() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "192.168.4.1", "mode": "ap", "led": false, "pump": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/led"))
        .and(query_param("on", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = hydrobot_cmd(home.path());
    cmd.args(["-a", &server.address().to_string(), "led", "toggle"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("LED ligado"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_detect_not_ok_exits_with_validity_code() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": false })))
        .mount(&server)
        .await;

    let mut cmd = hydrobot_cmd(home.path());
    cmd.args(["--server", &server.uri(), "detect"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_detect_watch_prints_each_attempt() {
    let home = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "isFire": true, "score": 0.875 })),
        )
        .mount(&server)
        .await;

    let mut cmd = hydrobot_cmd(home.path());
    cmd.args(["--server", &server.uri(), "-o", "plain", "detect", "--watch", "3"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), ["fire 0.88"; 3]);
}
