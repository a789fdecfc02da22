//! Integration tests for the `venuecam` CLI binary.
//!
//! Argument parsing, local zone tooling, and error exit codes run without a
//! backend; the remaining cases drive the binary against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `venuecam` binary with env isolation.
///
/// Clears all `VENUECAM_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn venuecam_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("venuecam");
    cmd.env("HOME", "/tmp/venuecam-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/venuecam-cli-test-nonexistent")
        .env_remove("VENUECAM_PROFILE")
        .env_remove("VENUECAM_API_URL")
        .env_remove("VENUECAM_TOKEN")
        .env_remove("VENUECAM_OUTPUT")
        .env_remove("VENUECAM_INSECURE")
        .env_remove("VENUECAM_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn dining_camera() -> serde_json::Value {
    json!({
        "id": 5,
        "name": "Main Floor",
        "area_type": "DINING",
        "rtsp_url": "rtsp://10.0.0.15/live",
        "roi_settings": {},
        "status": "ONLINE",
        "latest_log": {"person_count": 18, "occupancy_percentage": 60.0, "tables_to_clean": 2}
    })
}

async fn mock_listing(server: &MockServer, cameras: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/cameras/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cameras))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = venuecam_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    venuecam_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("dashboard")
            .and(predicate::str::contains("cameras"))
            .and(predicate::str::contains("zone")),
    );
}

#[test]
fn test_version_flag() {
    venuecam_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("venuecam"));
}

#[test]
fn test_invalid_subcommand() {
    venuecam_cmd()
        .arg("floorplan")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_completions_bash() {
    venuecam_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("venuecam"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_dashboard_without_config_is_usage_error() {
    let output = venuecam_cmd().arg("dashboard").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No venue backend configured"), "{text}");
}

#[test]
fn test_unknown_profile() {
    let output = venuecam_cmd()
        .args(["--profile", "ghost", "dashboard"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("ghost"));
}

#[test]
fn test_config_path() {
    venuecam_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_watch_rejects_zero_interval() {
    venuecam_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "watch", "--interval", "0"])
        .assert()
        .failure()
        .code(2);
}

// ── Zone tooling ────────────────────────────────────────────────────

#[test]
fn test_zone_template_is_valid_for_its_area() {
    let output = venuecam_cmd()
        .args(["zone", "template", "--area", "entrance", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let template = String::from_utf8(output.stdout).unwrap();
    assert!(template.contains("\"LINE\""), "{template}");

    venuecam_cmd()
        .args(["zone", "validate", "--area", "entrance", "-o", "plain", "-"])
        .write_stdin(template)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn test_zone_validate_wrong_variant() {
    let output = venuecam_cmd()
        .args([
            "zone",
            "validate",
            "--area",
            "dining",
            r#"{"type": "LINE", "start": [0, 1], "end": [2, 3]}"#,
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("POLYGON"));
}

#[test]
fn test_zone_validate_syntax_error() {
    venuecam_cmd()
        .args(["zone", "validate", "--area", "kitchen", "{not json"])
        .assert()
        .failure()
        .code(2);
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_json() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;

    let output = venuecam_cmd()
        .args(["--api-url", &server.uri(), "-o", "json-compact", "dashboard"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["analytics"]["occupancy"], json!(60));
    assert_eq!(snapshot["analytics"]["tables_to_clean"], json!(2));
    assert_eq!(snapshot["analytics"]["total_cameras"], json!(1));
    assert_eq!(snapshot["cameras"].as_array().unwrap().len(), 1);
    assert!(snapshot["last_error"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/cameras/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad token"})))
        .mount(&server)
        .await;

    let output = venuecam_cmd()
        .args(["--api-url", &server.uri(), "dashboard"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cameras_list_plain() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;

    venuecam_cmd()
        .args(["--api-url", &server.uri(), "-o", "plain", "cameras", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cameras_set_rtsp_url() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/cameras/5"))
        .and(body_json(json!({"rtsp_url": "rtsp://10.0.0.99/main"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(dining_camera()))
        .expect(1)
        .mount(&server)
        .await;

    venuecam_cmd()
        .args([
            "--api-url",
            &server.uri(),
            "-o",
            "plain",
            "cameras",
            "set",
            "5",
            "--rtsp-url",
            "rtsp://10.0.0.99/main",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cameras_set_rejects_mismatched_zone() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    venuecam_cmd()
        .args([
            "--api-url",
            &server.uri(),
            "cameras",
            "set",
            "5",
            "--roi",
            r#"{"type": "RECTANGLE", "x": 0, "y": 0, "width": 10, "height": 10}"#,
        ])
        .assert()
        .failure()
        .code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cameras_show_unknown_id() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;

    venuecam_cmd()
        .args(["--api-url", &server.uri(), "cameras", "show", "42"])
        .assert()
        .failure()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_single_publish() {
    let server = MockServer::start().await;
    mock_listing(&server, json!([dining_camera()])).await;

    let output = venuecam_cmd()
        .args([
            "--api-url",
            &server.uri(),
            "-o",
            "json-compact",
            "watch",
            "--count",
            "1",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 1);
    let snapshot: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
    assert_eq!(snapshot["analytics"]["reporting_cameras"], json!(1));
}
