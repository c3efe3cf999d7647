//! Listener configuration handle
//!
//! `ListenerConfiguration` is the narrow surface the assigner needs from the
//! server configuration: per role, read or replace the connector list, and
//! read or patch the port of the existing plaintext connector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{PortError, Result};
use crate::server::connector::ConnectorConfig;

/// The two listener roles of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerRole {
    Application,
    Admin,
}

impl ListenerRole {
    pub const ALL: [ListenerRole; 2] = [ListenerRole::Application, ListenerRole::Admin];
}

impl fmt::Display for ListenerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerRole::Application => write!(f, "application"),
            ListenerRole::Admin => write!(f, "admin"),
        }
    }
}

pub trait ListenerConfiguration {
    fn connectors(&self, role: ListenerRole) -> &[ConnectorConfig];

    /// Replace the whole connector list for `role`
    fn set_connectors(&mut self, role: ListenerRole, connectors: Vec<ConnectorConfig>);

    /// Port of the first connector, if any
    fn port(&self, role: ListenerRole) -> Option<u16> {
        self.connectors(role).first().map(ConnectorConfig::port)
    }

    /// Patch the port of the first connector in place
    ///
    /// Only plaintext connectors can be patched; every other field is left as is.
    fn set_port(&mut self, role: ListenerRole, port: u16) -> Result<()>;

    /// Whether `set_port` would succeed for `role`
    fn has_plaintext_connector(&self, role: ListenerRole) -> bool {
        matches!(self.connectors(role).first(), Some(ConnectorConfig::Http(_)))
    }
}

/// Connector lists of the downstream server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub application_connectors: Vec<ConnectorConfig>,
    #[serde(default)]
    pub admin_connectors: Vec<ConnectorConfig>,
}

impl ServerConfig {
    fn connectors_mut(&mut self, role: ListenerRole) -> &mut Vec<ConnectorConfig> {
        match role {
            ListenerRole::Application => &mut self.application_connectors,
            ListenerRole::Admin => &mut self.admin_connectors,
        }
    }
}

impl ListenerConfiguration for ServerConfig {
    fn connectors(&self, role: ListenerRole) -> &[ConnectorConfig] {
        match role {
            ListenerRole::Application => &self.application_connectors,
            ListenerRole::Admin => &self.admin_connectors,
        }
    }

    fn set_connectors(&mut self, role: ListenerRole, connectors: Vec<ConnectorConfig>) {
        *self.connectors_mut(role) = connectors;
    }

    fn set_port(&mut self, role: ListenerRole, port: u16) -> Result<()> {
        let connector = self
            .connectors_mut(role)
            .first_mut()
            .and_then(ConnectorConfig::as_http_mut)
            .ok_or_else(|| {
                PortError::Configuration(format!(
                    "No plaintext {} connector configured to receive a dynamic port",
                    role
                ))
            })?;

        connector.port = port;
        Ok(())
    }
}
