//! # Dynports Core - dynamic listener ports for service bootstrap
//!
//! Resolves the two listener roles of a service, **application** and
//! **admin**, to concrete TCP ports before the server binds its sockets.
//! Ports are either left as configured (static assignment) or searched for in
//! a bounded range (dynamic assignment), then written back into the listener
//! configuration as plaintext or TLS connectors.
//!
//! ## Flow
//!
//! ```text
//!  service.yaml ──► ServiceConfig ──► PortAssigner ──► ServerConfig (rewritten)
//!                                        │
//!                          FreePortFinder + PortProbe
//!                    (random | incrementing | adjacent)
//! ```
//!
//! The probe only tells whether a port was free at the time it was checked;
//! another process may take it before the server binds.

pub mod config;
pub mod errors;
pub mod port;
pub mod server;

pub use config::{AssignmentMode, DynamicPortsConfig, SecurityMode, ServiceConfig};
pub use errors::{PortError, Result};
pub use port::{
    search_random_port, AdjacentPortFinder, FreePortFinder, IncrementingPortFinder, PortAssigner,
    PortFinderFactory, PortFinderKind, PortProbe, PortRange, RandomPortFinder, ServicePorts,
    TcpBindProbe, UsedPorts,
};
pub use server::{
    ConnectorConfig, HttpConnector, HttpsConnector, ListenerConfiguration, ListenerRole,
    ServerConfig, TlsMaterial,
};

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bootstrap file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "service.yaml";
