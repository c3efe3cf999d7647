/**
 * port module
 * Dynamic port allocation for the application and admin listeners
 */

pub mod assigner;
pub mod finder;
pub mod probe;
pub mod range;

pub use assigner::{PortAssigner, TLS_REQUIRED_MESSAGE};
pub use finder::{
    search_random_port, AdjacentPortFinder, FreePortFinder, IncrementingPortFinder,
    PortFinderFactory, PortFinderKind, RandomPortFinder, ServicePorts, UsedPorts,
};
pub use probe::{PortProbe, TcpBindProbe};
pub use range::PortRange;
