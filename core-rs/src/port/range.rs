/**
 * range.rs
 * Inclusive port interval eligible for dynamic assignment
 *
 * Bounds:
 * - minPort: [1, 65534]
 * - maxPort: [2, 65535]
 * - minPort < maxPort
 *
 * Derived once at construction:
 * - portCount   = maxPort - minPort + 1
 * - maxAttempts = 3 * portCount (retry budget for randomized search)
 *
 * Example:
 * - [9000, 9100] → portCount=101, maxAttempts=303
 */

use serde::Serialize;
use std::fmt;

use crate::errors::{PortError, Result};

/// Multiplier applied to the number of ports in a range to size the
/// randomized search budget.
pub const ATTEMPTS_PER_PORT: u32 = 3;

pub const MIN_PORT_FLOOR: u32 = 1;
pub const MIN_PORT_CEILING: u32 = 65534;
pub const MAX_PORT_FLOOR: u32 = 2;
pub const MAX_PORT_CEILING: u32 = 65535;

/// Validated port range for dynamic assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    min_port: u16,
    max_port: u16,
    port_count: u32,
    max_attempts: u32,
}

impl PortRange {
    /// Create a validated range
    ///
    /// Bounds are taken as `u32` so that out-of-domain values such as `65536`
    /// coming from configuration are reported instead of truncated.
    ///
    /// # Errors
    /// Returns `PortError::Configuration` naming the offending value when a
    /// bound is outside the TCP port domain or when `min_port >= max_port`.
    pub fn new(min_port: u32, max_port: u32) -> Result<Self> {
        if !(MIN_PORT_FLOOR..=MIN_PORT_CEILING).contains(&min_port) {
            return Err(PortError::Configuration(format!(
                "minPort must be between {} and {}, got {}",
                MIN_PORT_FLOOR, MIN_PORT_CEILING, min_port
            )));
        }

        if !(MAX_PORT_FLOOR..=MAX_PORT_CEILING).contains(&max_port) {
            return Err(PortError::Configuration(format!(
                "maxPort must be between {} and {}, got {}",
                MAX_PORT_FLOOR, MAX_PORT_CEILING, max_port
            )));
        }

        if min_port >= max_port {
            return Err(PortError::Configuration(format!(
                "minPort ({}) must be less than maxPort ({})",
                min_port, max_port
            )));
        }

        let port_count = max_port - min_port + 1;

        Ok(PortRange {
            min_port: min_port as u16,
            max_port: max_port as u16,
            port_count,
            max_attempts: ATTEMPTS_PER_PORT * port_count,
        })
    }

    pub fn min_port(&self) -> u16 {
        self.min_port
    }

    pub fn max_port(&self) -> u16 {
        self.max_port
    }

    /// Number of ports in the range, both ends included
    pub fn port_count(&self) -> u32 {
        self.port_count
    }

    /// Search budget for randomized strategies
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Check if port is within this range
    pub fn contains(&self, port: u16) -> bool {
        port >= self.min_port && port <= self.max_port
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min_port, self.max_port)
    }
}
