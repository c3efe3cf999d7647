/**
 * server module
 * Listener descriptors of the downstream HTTP(S) server and the handle used
 * to rewrite them with dynamically assigned ports
 */

pub mod connector;
pub mod listeners;

pub use connector::{ConnectorConfig, HttpConnector, HttpsConnector, TlsMaterial};
pub use listeners::{ListenerConfiguration, ListenerRole, ServerConfig};
