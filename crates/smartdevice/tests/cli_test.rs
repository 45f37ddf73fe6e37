//! Integration tests for the `smartdevice` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes, plus a
//! few end-to-end runs against a wiremock Home API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `smartdevice` binary with env isolation.
///
/// Clears all `SMARTDEVICE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn sd_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("smartdevice");
    cmd.env("HOME", "/tmp/smartdevice-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/smartdevice-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("SMARTDEVICE_PROFILE")
        .env_remove("SMARTDEVICE_API_URL")
        .env_remove("SMARTDEVICE_API_KEY")
        .env_remove("SMARTDEVICE_OUTPUT")
        .env_remove("SMARTDEVICE_TIMEOUT")
        .env_remove("SMARTDEVICE_USERNAME")
        .env_remove("SMARTDEVICE_PASSWORD");
    cmd
}

/// `sd_cmd` pointed at a mock Home API with an API key.
fn sd_against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = sd_cmd();
    cmd.args([
        "--api-url",
        &format!("{}/v1/", server.uri()),
        "--api-key",
        "cli-test-key",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write `toml` where the binary looks for its config when
/// `XDG_CONFIG_HOME` points at the returned directory.
fn config_home(toml: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("smartdevice");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), toml).unwrap();
    dir
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_fridge(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .and(header("api-key", "cli-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "deviceId": "A",
            "deviceName": "CBNbsd 576i",
            "deviceType": "COMBI",
            "nickname": "Kitchen"
        }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/A/controls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "type": "TemperatureControl",
                "name": "temperature",
                "zoneId": 0,
                "zonePosition": "top",
                "value": 5,
                "target": 4,
                "min": 2,
                "max": 9,
                "unit": "°C"
            },
            {
                "type": "ToggleControl",
                "name": "supercool",
                "zoneId": 0,
                "value": false
            }
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sd_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    sd_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("appliances")
            .and(predicate::str::contains("notifications"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    sd_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("smartdevice"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    sd_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    sd_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Errors without configuration ────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = sd_cmd().arg("defrost").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_list_without_config_fails() {
    let output = sd_cmd().args(["appliances", "list"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("config init"),
        "Expected setup hint in output:\n{text}"
    );
}

#[test]
fn test_unknown_profile_is_not_found() {
    let output = sd_cmd()
        .args(["--profile", "cabin", "appliances", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_config_path_prints_location() {
    sd_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_masks_secrets_from_file() {
    let home = config_home(
        r#"
default_profile = "kitchen"

[profiles.kitchen]
api_key = "file-secret-key"
"#,
    );

    let output = sd_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["-o", "json-compact", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("file-secret-key"), "secret leaked:\n{stdout}");
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["profiles"]["kitchen"]["api_key"], "********");
}

// ── Against a mock Home API ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_from_config_file_drives_requests() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;
    let home = config_home(&format!(
        r#"
default_profile = "kitchen"

[profiles.kitchen]
api_key = "cli-test-key"
api_url = "{}/v1/"
"#,
        server.uri()
    ));

    let mut cmd = sd_cmd();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .args(["-o", "plain", "appliances", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "A");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_appliances_list_json() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;

    let mut cmd = sd_against(&server);
    cmd.args(["-o", "json-compact", "appliances", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["device_id"], "A");
    assert_eq!(listed[0]["nickname"], "Kitchen");
    assert_eq!(listed[0]["controls"].as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_controls_list_plain() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;

    let mut cmd = sd_against(&server);
    cmd.args(["-o", "plain", "controls", "list", "A"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "temperature@0\nsupercool@0");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_appliance_exits_not_found() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;

    let mut cmd = sd_against(&server);
    cmd.args(["appliances", "get", "Z"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_temperature_posts_to_home_api() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/devices/A/controls/temperature"))
        .and(body_json(json!({ "zoneId": 0, "target": 3, "unit": "°C" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = sd_against(&server);
    cmd.args(["set", "temperature", "A", "3"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_out_of_range_temperature_is_a_usage_error() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/devices/A/controls/temperature"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = sd_against(&server);
    cmd.args(["set", "temperature", "A", "20"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_toggle_fills_zone_from_snapshot() {
    let server = MockServer::start().await;
    mount_fridge(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/devices/A/controls/supercool"))
        .and(body_json(json!({ "zoneId": 0, "value": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = sd_against(&server);
    cmd.args(["set", "toggle", "A", "supercool", "on"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}
