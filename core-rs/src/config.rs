/**
 * config.rs
 * Parser for the service bootstrap file (YAML format)
 *
 * Format:
 * ```yaml
 * ports:
 *   assignment: dynamic
 *   security: non-secure
 *   minPort: 9000
 *   maxPort: 9100
 *   finder: random
 * server:
 *   applicationConnectors:
 *     - type: http
 *       port: 8080
 *   adminConnectors:
 *     - type: http
 *       port: 8081
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::errors::{PortError, Result};
use crate::port::finder::PortFinderKind;
use crate::port::range::PortRange;
use crate::server::{ServerConfig, TlsMaterial};

/// Whether listener ports come from configuration or from a range search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    #[default]
    Static,
    Dynamic,
}

/// Whether discovered ports back TLS or plaintext listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityMode {
    Secure,
    #[default]
    NonSecure,
}

impl fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentMode::Static => write!(f, "static"),
            AssignmentMode::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityMode::Secure => write!(f, "secure"),
            SecurityMode::NonSecure => write!(f, "non-secure"),
        }
    }
}

/// `ports` section: how the application and admin ports are resolved
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPortsConfig {
    #[serde(default)]
    pub assignment: AssignmentMode,
    #[serde(default)]
    pub security: SecurityMode,
    /// Kept wide so out-of-domain values reach range validation intact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_port: Option<u32>,
    #[serde(default)]
    pub finder: PortFinderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsMaterial>,
}

impl DynamicPortsConfig {
    pub fn dynamic(min_port: u32, max_port: u32) -> Self {
        DynamicPortsConfig {
            assignment: AssignmentMode::Dynamic,
            min_port: Some(min_port),
            max_port: Some(max_port),
            ..Default::default()
        }
    }

    /// Build the configured range
    ///
    /// # Returns
    /// `None` when neither bound is set, meaning "let the OS choose"
    ///
    /// # Errors
    /// `PortError::Configuration` when only one bound is set or the bounds are invalid
    pub fn port_range(&self) -> Result<Option<PortRange>> {
        match (self.min_port, self.max_port) {
            (None, None) => Ok(None),
            (Some(min), Some(max)) => PortRange::new(min, max).map(Some),
            (Some(min), None) => Err(PortError::Configuration(format!(
                "minPort ({}) is set but maxPort is missing",
                min
            ))),
            (None, Some(max)) => Err(PortError::Configuration(format!(
                "maxPort ({}) is set but minPort is missing",
                max
            ))),
        }
    }
}

/// Service bootstrap file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub ports: DynamicPortsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl ServiceConfig {
    /// Load a bootstrap file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML file
    ///
    /// # Example
    /// ```ignore
    /// let config = ServiceConfig::load("service.yaml")?;
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PortError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;

        tracing::debug!(path = %path.display(), "Loaded service configuration");
        Ok(config)
    }

    /// Parse and validate YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ServiceConfig = serde_yaml::from_str(content)
            .map_err(|e| PortError::ParseError(format!("Invalid service YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Structural checks only
    ///
    /// Range bounds are checked when assignment is dynamic. TLS material is
    /// not checked here; the assigner owns that precondition.
    pub fn validate(&self) -> Result<()> {
        if self.ports.assignment == AssignmentMode::Dynamic {
            self.ports
                .port_range()
                .map_err(|e| PortError::ValidationError(e.to_string()))?;
        }

        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration, typically after ports were assigned
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_yaml()?)?;
        Ok(())
    }
}
