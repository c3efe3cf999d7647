//! Error types for dynamic port allocation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    /// Invalid range bounds, missing TLS material, or a listener layout the
    /// assigner cannot work with. Always raised before any port is probed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bounded search ran out of attempts for one listener role.
    #[error("Could not find an available port between {min_port} and {max_port} after {attempts} attempts. I give up.")]
    NoAvailablePort {
        min_port: u16,
        max_port: u16,
        attempts: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl PortError {
    /// True for the two terminal bootstrap failures (bad configuration or
    /// search exhaustion), as opposed to loader I/O problems.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            PortError::Configuration(_) | PortError::NoAvailablePort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PortError>;
