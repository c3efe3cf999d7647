//! Integration tests for the bootstrap file lifecycle
//!
//! load → assign → save → reload

use dynports_core::{
    AssignmentMode, ConnectorConfig, ListenerConfiguration, ListenerRole, PortAssigner,
    PortError, ServiceConfig,
};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("service.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_assign_and_persist_plaintext_ports() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
ports:
  assignment: dynamic
  minPort: 41000
  maxPort: 41020
  finder: incrementing
server:
  applicationConnectors:
    - type: http
      port: 8080
      bindHost: 0.0.0.0
  adminConnectors:
    - type: http
      port: 8081
"#,
    );

    // 1. Load
    let mut config = ServiceConfig::load(&path).unwrap();
    assert_eq!(config.ports.assignment, AssignmentMode::Dynamic);

    // 2. Assign with a probe that rejects the first two ports
    let ports = PortAssigner::new(config.ports.clone())
        .with_probe(|port: u16| port > 41001)
        .assign_dynamic_ports(&mut config.server)
        .unwrap();
    assert_eq!((ports.application_port, ports.admin_port), (41002, 41003));

    // 3. Save to a separate file and reload
    let out = temp_dir.path().join("service.resolved.yaml");
    config.save(&out).unwrap();
    let reloaded = ServiceConfig::load(&out).unwrap();

    assert_eq!(reloaded.server.port(ListenerRole::Application), Some(41002));
    assert_eq!(reloaded.server.port(ListenerRole::Admin), Some(41003));
    match &reloaded.server.application_connectors[0] {
        ConnectorConfig::Http(http) => assert_eq!(http.bind_host.as_deref(), Some("0.0.0.0")),
        other => panic!("Expected http connector, got {:?}", other),
    }

    // 4. Original file untouched
    let original = ServiceConfig::load(&path).unwrap();
    assert_eq!(original.server.port(ListenerRole::Application), Some(8080));
}

#[test]
fn test_secure_without_tls_loads_then_fails_at_assignment() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
ports:
  assignment: dynamic
  security: secure
  minPort: 9000
  maxPort: 9100
server:
  applicationConnectors:
    - type: http
      port: 8080
  adminConnectors:
    - type: http
      port: 8081
"#,
    );

    let mut config = ServiceConfig::load(&path).unwrap();
    let before = config.server.clone();

    let err = PortAssigner::new(config.ports.clone())
        .with_probe(|_: u16| -> bool { panic!("probe must not run without TLS material") })
        .assign_dynamic_ports(&mut config.server)
        .unwrap_err();

    assert!(matches!(err, PortError::Configuration(_)));
    assert_eq!(config.server, before);
}

#[test]
fn test_invalid_files_are_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let path = write_config(&temp_dir, "ports: [not, a, mapping]\n");
    assert!(matches!(
        ServiceConfig::load(&path).unwrap_err(),
        PortError::ParseError(_)
    ));

    let path = write_config(
        &temp_dir,
        "ports:\n  assignment: dynamic\n  minPort: 9000\n  maxPort: 65536\n",
    );
    let err = ServiceConfig::load(&path).unwrap_err();
    assert!(matches!(err, PortError::ValidationError(_)));
    assert!(err.to_string().contains("65536"));

    let missing = temp_dir.path().join("nope.yaml");
    assert!(matches!(
        ServiceConfig::load(&missing).unwrap_err(),
        PortError::FileNotFound(_)
    ));
}
