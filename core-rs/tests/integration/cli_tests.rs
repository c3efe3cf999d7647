//! Integration tests for the dynports binary
//!
//! Runs the built executable and checks its output and exit status.

use dynports_core::{ConnectorConfig, ListenerConfiguration, ListenerRole, ServiceConfig};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn dynports(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dynports"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run dynports")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp path is valid UTF-8")
}

#[test]
fn test_range_reports_budget() {
    let output = dynports(&["range", "9000", "9100"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("[9000, 9100]"), "stdout: {}", out);
    assert!(out.contains("portCount:   101"), "stdout: {}", out);
    assert!(out.contains("maxAttempts: 303"), "stdout: {}", out);
}

#[test]
fn test_range_rejects_zero_min() {
    let output = dynports(&["range", "0", "9000"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"), "stderr: {}", err);
    assert!(err.contains("got 0"), "stderr: {}", err);
}

#[test]
fn test_finders_lists_all_strategies() {
    let output = dynports(&["finders"]);

    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "stdout: {}", out);
    assert!(lines[0].contains("random") && lines[0].contains("(default)"));
    assert_eq!(lines[1], "incrementing");
    assert_eq!(lines[2], "adjacent");
}

#[test]
fn test_assign_json_and_write() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("service.yaml");
    let out_path = temp_dir.path().join("service.resolved.yaml");
    fs::write(
        &config_path,
        r#"
ports:
  assignment: dynamic
  minPort: 47000
  maxPort: 47999
server:
  applicationConnectors:
    - type: http
      port: 8080
  adminConnectors:
    - type: http
      port: 8081
"#,
    )
    .unwrap();

    let output = dynports(&[
        "assign",
        "--config",
        path_arg(&config_path),
        "--format",
        "json",
        "--write",
        path_arg(&out_path),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    // 1. Stdout is the JSON report
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let application_port = report["ports"]["applicationPort"].as_u64().unwrap();
    let admin_port = report["ports"]["adminPort"].as_u64().unwrap();
    assert!((47000..=47999).contains(&application_port));
    assert!((47000..=47999).contains(&admin_port));
    assert_ne!(application_port, admin_port);

    // 2. The written file reloads with the same ports
    let reloaded = ServiceConfig::load(&out_path).unwrap();
    assert_eq!(
        reloaded.server.port(ListenerRole::Application).map(u64::from),
        Some(application_port)
    );
    assert_eq!(
        reloaded.server.port(ListenerRole::Admin).map(u64::from),
        Some(admin_port)
    );

    // 3. The input file is left alone
    let original = ServiceConfig::load(&config_path).unwrap();
    assert_eq!(original.server.port(ListenerRole::Application), Some(8080));
}

#[test]
fn test_assign_masks_tls_passwords_in_report() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("service.yaml");
    let out_path = temp_dir.path().join("service.resolved.yaml");
    fs::write(
        &config_path,
        r#"
ports:
  assignment: dynamic
  security: secure
  minPort: 48000
  maxPort: 48999
  tls:
    keyStorePath: /etc/svc/keystore.p12
    keyStorePassword: ks-secret
    trustStorePath: /etc/svc/truststore.p12
    trustStorePassword: ts-secret
"#,
    )
    .unwrap();

    let output = dynports(&[
        "assign",
        "--config",
        path_arg(&config_path),
        "--write",
        path_arg(&out_path),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(!out.contains("ks-secret"), "stdout: {}", out);
    assert!(!out.contains("ts-secret"), "stdout: {}", out);
    assert!(out.contains("keyStorePath"), "stdout: {}", out);

    // The saved configuration keeps the real material
    let saved = ServiceConfig::load(&out_path).unwrap();
    match &saved.server.connectors(ListenerRole::Application)[0] {
        ConnectorConfig::Https(https) => {
            assert_eq!(https.key_store_password, "ks-secret");
            assert_eq!(https.trust_store_password, "ts-secret");
        }
        other => panic!("Expected https connector, got {:?}", other),
    }
}

#[test]
fn test_assign_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.yaml");

    let output = dynports(&["assign", "--config", path_arg(&missing)]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Failed to load"), "stderr: {}", err);
}

#[test]
fn test_version_output() {
    let output = dynports(&["--version"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("dynports") && out.contains(dynports_core::VERSION));
}
