//! Free port search strategies
//!
//! One contract (`FreePortFinder`), three interchangeable strategies selected
//! by logical name from configuration:
//! - `random` (default): uniform random draws, bounded by the range's attempt budget
//! - `incrementing`: linear scan from the bottom of the range
//! - `adjacent`: application and admin ports on consecutive numbers

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::errors::{PortError, Result};
use crate::port::probe::PortProbe;
use crate::port::range::PortRange;

/// Final ports for the two listener roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePorts {
    pub application_port: u16,
    pub admin_port: u16,
}

/// Ports already claimed during one assignment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedPorts {
    ports: BTreeSet<u16>,
}

impl UsedPorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    /// Record a port as taken. Returns false if it was already claimed.
    pub fn claim(&mut self, port: u16) -> bool {
        self.ports.insert(port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

/// Logical name of a search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortFinderKind {
    #[default]
    Random,
    Incrementing,
    Adjacent,
}

impl PortFinderKind {
    pub const ALL: [PortFinderKind; 3] = [
        PortFinderKind::Random,
        PortFinderKind::Incrementing,
        PortFinderKind::Adjacent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PortFinderKind::Random => "random",
            PortFinderKind::Incrementing => "incrementing",
            PortFinderKind::Adjacent => "adjacent",
        }
    }
}

impl fmt::Display for PortFinderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PortFinderKind {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self> {
        PortFinderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = PortFinderKind::ALL.iter().map(|k| k.name()).collect();
                PortError::Configuration(format!(
                    "Unknown port finder '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Port search strategy
///
/// Implementations must never hand out the same port twice in one call, and
/// must only return ports inside `range` for which `probe` answered true.
pub trait FreePortFinder {
    fn kind(&self) -> PortFinderKind;

    /// Find an application port and an admin port within `range`
    fn find(&self, range: &PortRange, probe: &dyn PortProbe) -> Result<ServicePorts>;
}

/// Bounded random search for a single port
///
/// Draws up to `range.max_attempts()` candidates uniformly from the range.
/// A candidate is accepted when the probe reports it available and it has not
/// been claimed in `used`; the accepted port is claimed before returning.
/// The probe is called once per attempt.
pub fn search_random_port<R: Rng>(
    range: &PortRange,
    probe: &dyn PortProbe,
    used: &mut UsedPorts,
    rng: &mut R,
) -> Result<u16> {
    for attempt in 1..=range.max_attempts() {
        let candidate = rng.gen_range(range.min_port()..=range.max_port());

        if probe.is_available(candidate) && !used.contains(candidate) {
            used.claim(candidate);
            debug!(port = candidate, attempt, "Found available port");
            return Ok(candidate);
        }

        debug!(port = candidate, attempt, "Candidate port rejected");
    }

    Err(exhausted(range, range.max_attempts()))
}

fn exhausted(range: &PortRange, attempts: u32) -> PortError {
    warn!(
        min_port = range.min_port(),
        max_port = range.max_port(),
        attempts,
        "Port search exhausted"
    );
    PortError::NoAvailablePort {
        min_port: range.min_port(),
        max_port: range.max_port(),
        attempts,
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Default strategy: independent random draws for each role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomPortFinder {
    seed: Option<u64>,
}

impl RandomPortFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible candidate sequence
    pub fn seeded(seed: u64) -> Self {
        RandomPortFinder { seed: Some(seed) }
    }
}

impl FreePortFinder for RandomPortFinder {
    fn kind(&self) -> PortFinderKind {
        PortFinderKind::Random
    }

    fn find(&self, range: &PortRange, probe: &dyn PortProbe) -> Result<ServicePorts> {
        let mut rng = rng_from(self.seed);
        let mut used = UsedPorts::new();

        let application_port = search_random_port(range, probe, &mut used, &mut rng)?;
        let admin_port = search_random_port(range, probe, &mut used, &mut rng)?;

        Ok(ServicePorts {
            application_port,
            admin_port,
        })
    }
}

/// Linear scan from `min_port` upwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncrementingPortFinder;

impl IncrementingPortFinder {
    /// Lowest available, unclaimed port in the range. Each port is probed at
    /// most once; on exhaustion the attempt count is the range size.
    pub fn next_port(
        &self,
        range: &PortRange,
        probe: &dyn PortProbe,
        used: &mut UsedPorts,
    ) -> Result<u16> {
        for port in range.min_port()..=range.max_port() {
            if used.contains(port) {
                continue;
            }
            if probe.is_available(port) {
                used.claim(port);
                debug!(port, "Found available port");
                return Ok(port);
            }
        }

        Err(exhausted(range, range.port_count()))
    }
}

impl FreePortFinder for IncrementingPortFinder {
    fn kind(&self) -> PortFinderKind {
        PortFinderKind::Incrementing
    }

    fn find(&self, range: &PortRange, probe: &dyn PortProbe) -> Result<ServicePorts> {
        let mut used = UsedPorts::new();

        let application_port = self.next_port(range, probe, &mut used)?;
        let admin_port = self.next_port(range, probe, &mut used)?;

        Ok(ServicePorts {
            application_port,
            admin_port,
        })
    }
}

/// Random base port whose successor is also free; the pair becomes
/// application (base) and admin (base + 1).
///
/// Every probe call, for the base or its successor, counts against the
/// range's attempt budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjacentPortFinder {
    seed: Option<u64>,
}

impl AdjacentPortFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        AdjacentPortFinder { seed: Some(seed) }
    }
}

impl FreePortFinder for AdjacentPortFinder {
    fn kind(&self) -> PortFinderKind {
        PortFinderKind::Adjacent
    }

    fn find(&self, range: &PortRange, probe: &dyn PortProbe) -> Result<ServicePorts> {
        let mut rng = rng_from(self.seed);
        // min_port < max_port, so there is always at least one base
        let highest_base = range.max_port() - 1;
        let budget = range.max_attempts();
        let mut probes = 0;

        while probes < budget {
            let base = rng.gen_range(range.min_port()..=highest_base);
            let next = base + 1;

            probes += 1;
            if !probe.is_available(base) {
                debug!(port = base, attempt = probes, "Candidate port rejected");
                continue;
            }
            if probes == budget {
                break;
            }

            probes += 1;
            if probe.is_available(next) {
                debug!(
                    application_port = base,
                    admin_port = next,
                    attempt = probes,
                    "Found adjacent ports"
                );
                return Ok(ServicePorts {
                    application_port: base,
                    admin_port: next,
                });
            }

            debug!(port = next, attempt = probes, "Adjacent port rejected");
        }

        Err(exhausted(range, budget))
    }
}

/// Strategy registry keyed by logical name
pub struct PortFinderFactory;

impl PortFinderFactory {
    pub fn create(kind: PortFinderKind) -> Box<dyn FreePortFinder> {
        match kind {
            PortFinderKind::Random => Box::new(RandomPortFinder::new()),
            PortFinderKind::Incrementing => Box::new(IncrementingPortFinder),
            PortFinderKind::Adjacent => Box::new(AdjacentPortFinder::new()),
        }
    }

    /// Look up a strategy by its configuration name
    ///
    /// # Errors
    /// `PortError::Configuration` listing the known names when `name` is not registered
    pub fn from_name(name: &str) -> Result<Box<dyn FreePortFinder>> {
        let kind: PortFinderKind = name.parse()?;
        Ok(Self::create(kind))
    }

    pub fn names() -> Vec<&'static str> {
        PortFinderKind::ALL.iter().map(|k| k.name()).collect()
    }
}
