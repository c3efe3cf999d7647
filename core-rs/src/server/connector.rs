/**
 * connector.rs
 * Listener descriptors handed to the downstream HTTP(S) server
 *
 * Format (one entry of applicationConnectors / adminConnectors):
 * ```yaml
 * - type: http
 *   port: 8080
 *   bindHost: 0.0.0.0
 * - type: https
 *   port: 8443
 *   keyStorePath: /etc/svc/keystore.jks
 *   keyStorePassword: changeit
 *   trustStorePath: /etc/svc/truststore.jks
 *   trustStorePassword: changeit
 *   supportedProtocols: [TLSv1.2, TLSv1.3]
 * ```
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{PortError, Result};

/// Key and trust material for TLS listeners
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsMaterial {
    #[serde(default)]
    pub key_store_path: Option<PathBuf>,
    #[serde(default)]
    pub key_store_password: Option<String>,
    #[serde(default)]
    pub trust_store_path: Option<PathBuf>,
    #[serde(default)]
    pub trust_store_password: Option<String>,
    #[serde(default)]
    pub supported_protocols: Vec<String>,
}

impl TlsMaterial {
    /// Names of the required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        fn blank_path(p: &Option<PathBuf>) -> bool {
            p.as_ref().map_or(true, |p| p.as_os_str().is_empty())
        }
        fn blank(s: &Option<String>) -> bool {
            s.as_ref().map_or(true, |s| s.is_empty())
        }

        let mut missing = Vec::new();
        if blank_path(&self.key_store_path) {
            missing.push("keyStorePath");
        }
        if blank(&self.key_store_password) {
            missing.push("keyStorePassword");
        }
        if blank_path(&self.trust_store_path) {
            missing.push("trustStorePath");
        }
        if blank(&self.trust_store_password) {
            missing.push("trustStorePassword");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Plaintext listener
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpConnector {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_queue_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub use_forwarded_headers: bool,
}

impl HttpConnector {
    pub fn new(port: u16) -> Self {
        HttpConnector {
            port,
            ..Default::default()
        }
    }
}

/// TLS-terminated listener
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpsConnector {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_host: Option<String>,
    pub key_store_path: PathBuf,
    pub key_store_password: String,
    pub trust_store_path: PathBuf,
    pub trust_store_password: String,
    #[serde(default)]
    pub supported_protocols: Vec<String>,
}

impl HttpsConnector {
    /// Build a TLS listener on `port` from complete TLS material
    ///
    /// # Errors
    /// `PortError::Configuration` naming the missing fields
    pub fn from_tls(port: u16, tls: &TlsMaterial) -> Result<Self> {
        match (
            &tls.key_store_path,
            &tls.key_store_password,
            &tls.trust_store_path,
            &tls.trust_store_password,
        ) {
            (
                Some(key_store_path),
                Some(key_store_password),
                Some(trust_store_path),
                Some(trust_store_password),
            ) if tls.is_complete() => {
                Ok(HttpsConnector {
                    port,
                    bind_host: None,
                    key_store_path: key_store_path.clone(),
                    key_store_password: key_store_password.clone(),
                    trust_store_path: trust_store_path.clone(),
                    trust_store_password: trust_store_password.clone(),
                    supported_protocols: tls.supported_protocols.clone(),
                })
            }
            _ => Err(PortError::Configuration(format!(
                "TLS configuration is incomplete, missing: {}",
                tls.missing_fields().join(", ")
            ))),
        }
    }
}

/// One bound socket of the downstream server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectorConfig {
    Http(HttpConnector),
    Https(HttpsConnector),
}

impl ConnectorConfig {
    pub fn port(&self) -> u16 {
        match self {
            ConnectorConfig::Http(c) => c.port,
            ConnectorConfig::Https(c) => c.port,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, ConnectorConfig::Https(_))
    }

    pub fn as_http_mut(&mut self) -> Option<&mut HttpConnector> {
        match self {
            ConnectorConfig::Http(c) => Some(c),
            ConnectorConfig::Https(_) => None,
        }
    }
}
