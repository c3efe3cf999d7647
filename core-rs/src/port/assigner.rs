/**
 * assigner.rs
 * Resolves the application and admin listener ports at startup
 *
 * Flow (single assignment, no retained state):
 * - static assignment → configured ports untouched, nothing probed
 * - dynamic assignment:
 *   1. preconditions (TLS material for secure, range bounds, plaintext
 *      connectors for non-secure); nothing is probed if any fails
 *   2. search application port, then admin port, sharing one used-port set
 *   3. rewrite listeners: secure → replace connector lists with one TLS
 *      connector per role; non-secure → patch the port of the existing
 *      plaintext connector
 *
 * Both ports are reserved before any listener is rewritten, so a failed
 * admin search leaves the listener configuration untouched.
 */

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{AssignmentMode, DynamicPortsConfig, SecurityMode};
use crate::errors::{PortError, Result};
use crate::port::finder::{
    search_random_port, FreePortFinder, PortFinderFactory, ServicePorts, UsedPorts,
};
use crate::port::probe::{PortProbe, TcpBindProbe};
use crate::port::range::PortRange;
use crate::server::{
    ConnectorConfig, HttpsConnector, ListenerConfiguration, ListenerRole, TlsMaterial,
};

pub const TLS_REQUIRED_MESSAGE: &str =
    "TLS configuration is required when assigning secure dynamic ports";

/// Port assigner for one bootstrap run
pub struct PortAssigner {
    config: DynamicPortsConfig,
    probe: Box<dyn PortProbe>,
    finder: Box<dyn FreePortFinder>,
}

impl PortAssigner {
    /// Create an assigner using the OS bind probe and the configured finder
    pub fn new(config: DynamicPortsConfig) -> Self {
        let finder = PortFinderFactory::create(config.finder);
        PortAssigner {
            config,
            probe: Box::new(TcpBindProbe::default()),
            finder,
        }
    }

    pub fn with_probe<P: PortProbe + 'static>(mut self, probe: P) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_finder(mut self, finder: Box<dyn FreePortFinder>) -> Self {
        self.finder = finder;
        self
    }

    pub fn config(&self) -> &DynamicPortsConfig {
        &self.config
    }

    pub fn finder(&self) -> &dyn FreePortFinder {
        self.finder.as_ref()
    }

    /// Resolve both listener ports and rewrite `listeners` accordingly
    ///
    /// # Returns
    /// The final ports. In static mode these are the ports already configured
    /// (0 for a role without a connector).
    ///
    /// # Errors
    /// - `PortError::Configuration` when a precondition fails (before any probing)
    /// - `PortError::NoAvailablePort` when the search for either role is exhausted
    pub fn assign_dynamic_ports(
        &self,
        listeners: &mut dyn ListenerConfiguration,
    ) -> Result<ServicePorts> {
        if self.config.assignment == AssignmentMode::Static {
            debug!("Static port assignment, leaving listeners untouched");
            return Ok(current_ports(listeners));
        }

        match self.config.security {
            SecurityMode::Secure => self.assign_secure(listeners),
            SecurityMode::NonSecure => self.assign_non_secure(listeners),
        }
    }

    fn assign_secure(&self, listeners: &mut dyn ListenerConfiguration) -> Result<ServicePorts> {
        let tls = self.require_tls()?;
        let range = self.config.port_range()?;

        let ports = self.reserve_ports(range.as_ref())?;

        // Build both before touching the listeners
        let application = HttpsConnector::from_tls(ports.application_port, tls)?;
        let admin = HttpsConnector::from_tls(ports.admin_port, tls)?;

        listeners.set_connectors(
            ListenerRole::Application,
            vec![ConnectorConfig::Https(application)],
        );
        listeners.set_connectors(ListenerRole::Admin, vec![ConnectorConfig::Https(admin)]);

        info!(
            application_port = ports.application_port,
            admin_port = ports.admin_port,
            "Assigned secure dynamic ports"
        );
        Ok(ports)
    }

    fn assign_non_secure(
        &self,
        listeners: &mut dyn ListenerConfiguration,
    ) -> Result<ServicePorts> {
        let range = self.config.port_range()?;

        for role in ListenerRole::ALL {
            if !listeners.has_plaintext_connector(role) {
                warn!(%role, "Missing plaintext connector for dynamic port");
                return Err(PortError::Configuration(format!(
                    "No plaintext {} connector configured to receive a dynamic port",
                    role
                )));
            }
        }

        let ports = self.reserve_ports(range.as_ref())?;

        listeners.set_port(ListenerRole::Application, ports.application_port)?;
        listeners.set_port(ListenerRole::Admin, ports.admin_port)?;

        info!(
            application_port = ports.application_port,
            admin_port = ports.admin_port,
            "Assigned dynamic ports"
        );
        Ok(ports)
    }

    fn require_tls(&self) -> Result<&TlsMaterial> {
        match &self.config.tls {
            Some(tls) if tls.is_complete() => Ok(tls),
            Some(tls) => {
                warn!(missing = ?tls.missing_fields(), "Incomplete TLS material");
                Err(PortError::Configuration(format!(
                    "{} (missing: {})",
                    TLS_REQUIRED_MESSAGE,
                    tls.missing_fields().join(", ")
                )))
            }
            None => {
                warn!("No TLS material for secure dynamic ports");
                Err(PortError::Configuration(TLS_REQUIRED_MESSAGE.to_string()))
            }
        }
    }

    fn reserve_ports(&self, range: Option<&PortRange>) -> Result<ServicePorts> {
        match range {
            Some(range) => {
                info!(
                    range = %range,
                    finder = %self.finder.kind(),
                    max_attempts = range.max_attempts(),
                    "Searching for dynamic ports"
                );
                self.finder.find(range, self.probe.as_ref())
            }
            None => {
                debug!("No port range configured, deferring port choice to the OS");
                Ok(ServicePorts {
                    application_port: 0,
                    admin_port: 0,
                })
            }
        }
    }

    /// Bounded random search for one port
    ///
    /// Never returns a port already in `used`; the returned port is added to it.
    /// Returns 0 ("let the OS choose") when no range is configured.
    ///
    /// # Errors
    /// `PortError::NoAvailablePort` after `max_attempts` probes, or
    /// `PortError::Configuration` for invalid bounds
    pub fn find_free_port(&self, used: &mut UsedPorts) -> Result<u16> {
        match self.config.port_range()? {
            Some(range) => {
                let mut rng = StdRng::from_entropy();
                search_random_port(&range, self.probe.as_ref(), used, &mut rng)
            }
            None => Ok(0),
        }
    }
}

fn current_ports(listeners: &dyn ListenerConfiguration) -> ServicePorts {
    ServicePorts {
        application_port: listeners.port(ListenerRole::Application).unwrap_or(0),
        admin_port: listeners.port(ListenerRole::Admin).unwrap_or(0),
    }
}
