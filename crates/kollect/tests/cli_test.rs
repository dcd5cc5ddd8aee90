//! Integration tests for the `kollect` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; the status, disconnect and chat tests talk to a
//! wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `kollect` binary with env isolation.
///
/// Clears all `KOLLECT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn kollect_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("kollect");
    cmd.env("HOME", "/tmp/kollect-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/kollect-cli-test-nonexistent")
        .env_remove("KOLLECT_PROFILE")
        .env_remove("KOLLECT_BACKEND")
        .env_remove("KOLLECT_SOURCE")
        .env_remove("KOLLECT_OUTPUT")
        .env_remove("KOLLECT_INSECURE")
        .env_remove("KOLLECT_TIMEOUT")
        .env_remove("KOLLECT_AWS_SECRET_KEY")
        .env_remove("KOLLECT_AZURE_CLIENT_SECRET")
        .env_remove("KOLLECT_VEEAM_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || kollect_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = kollect_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    kollect_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("configure"))
            .and(predicate::str::contains("disconnect"))
            .and(predicate::str::contains("inventory")),
    );
}

#[test]
fn test_version_flag() {
    kollect_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kollect"));
}

#[test]
fn test_configure_subcommands_exist() {
    kollect_cmd()
        .args(["configure", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("aws")
                .and(predicate::str::contains("azure-cli"))
                .and(predicate::str::contains("kubernetes"))
                .and(predicate::str::contains("veeam")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    kollect_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    kollect_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    kollect_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kollect").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_show_no_config() {
    kollect_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = kollect_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_backend_url() {
    let output = kollect_cmd()
        .args(["--backend", "ftp://example.com", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("backend"));
}

#[test]
fn test_unknown_platform_rejected() {
    let output = kollect_cmd()
        .args(["disconnect", "gcp", "--yes"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_disconnect_requires_confirmation() {
    let output = kollect_cmd()
        .args(["--backend", "http://127.0.0.1:9", "disconnect", "aws"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[test]
fn test_configure_without_input_is_usage_error() {
    let output = kollect_cmd()
        .args(["--backend", "http://127.0.0.1:9", "configure", "aws"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("access-key"));
}

#[test]
fn test_status_unreachable_backend_fails_safe() {
    kollect_cmd()
        .args(["--backend", "http://127.0.0.1:9", "-o", "plain", "status"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("aws disconnected")
                .and(predicate::str::contains("veeam disconnected")),
        );
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reads_bulk_inventory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AzureVMs": [{ "name": "vm-1" }],
            "EC2Instances": []
        })))
        .mount(&server)
        .await;

    let output = run_blocking(vec![
        "--backend".into(),
        server.uri(),
        "-o".into(),
        "plain".into(),
        "status".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("azure connected"), "{stdout}");
    assert!(stdout.contains("aws disconnected"), "{stdout}");
    assert!(stdout.contains("kubernetes not-configured"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/disconnect/kubernetes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "kubeconfig removed" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let output = run_blocking(vec![
        "--backend".into(),
        server.uri(),
        "--yes".into(),
        "disconnect".into(),
        "kubernetes".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("kubeconfig removed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_configure_rejection_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/configure/aws"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let output = run_blocking(vec![
        "--backend".into(),
        server.uri(),
        "configure".into(),
        "aws".into(),
        "--access-key".into(),
        "AKIA123".into(),
        "--secret-key".into(),
        "nope".into(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("invalid credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chat_prints_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "You have 3 pods", "updateUI": false })),
        )
        .mount(&server)
        .await;

    let output = run_blocking(vec![
        "--backend".into(),
        server.uri(),
        "chat".into(),
        "how".into(),
        "many".into(),
        "pods".into(),
    ])
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("You have 3 pods"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_uses_profile_from_config_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/veeam/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "isConnected": true, "hasData": true })),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("kollect");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "[profiles.lab]\nbackend = \"{}\"\nsnapshot_source = \"per-platform\"\n",
            server.uri()
        ),
    )
    .unwrap();

    let config_home = home.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        kollect_cmd()
            .env("XDG_CONFIG_HOME", &config_home)
            .args(["-p", "lab", "-o", "plain", "status"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("veeam connected"), "{stdout}");
    assert!(stdout.contains("aws disconnected"), "{stdout}");
}

#[test]
fn test_output_default_from_config_file() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("kollect");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[defaults]\noutput = \"plain\"\n").unwrap();

    kollect_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["--backend", "http://127.0.0.1:9", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aws disconnected"));

    // An explicit flag still wins over the config default.
    kollect_cmd()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["--backend", "http://127.0.0.1:9", "-o", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"platform\""));
}
