//! Port availability probing
//!
//! The probe is the only I/O in the allocation path. It is a trait so that
//! tests can drive the search with deterministic answers.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};

/// Answers "is this candidate port bindable right now?"
pub trait PortProbe {
    fn is_available(&self, port: u16) -> bool;
}

impl<F> PortProbe for F
where
    F: Fn(u16) -> bool,
{
    fn is_available(&self, port: u16) -> bool {
        self(port)
    }
}

/// OS-backed probe: binds a TCP listener on the candidate port and drops it
/// immediately.
///
/// Binds the unspecified address by default, which is what the real server
/// listeners usually do. The socket is released before returning, so another
/// process can still take the port before the server binds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpBindProbe {
    host: IpAddr,
}

impl TcpBindProbe {
    pub fn new(host: IpAddr) -> Self {
        TcpBindProbe { host }
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }
}

impl Default for TcpBindProbe {
    fn default() -> Self {
        TcpBindProbe::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl PortProbe for TcpBindProbe {
    fn is_available(&self, port: u16) -> bool {
        match TcpListener::bind(SocketAddr::new(self.host, port)) {
            Ok(_listener) => true,
            Err(e) => {
                tracing::trace!(port, host = %self.host, error = %e, "Port bind failed");
                false
            }
        }
    }
}
