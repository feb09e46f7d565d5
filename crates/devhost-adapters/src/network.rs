//! Port probes.

use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::{Arc, RwLock};

use devhost_core::application::ports::PortProbe;

/// Probes by trying to bind `127.0.0.1:<port>`; a failed bind means in use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortProbe;

impl TcpPortProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PortProbe for TcpPortProbe {
    fn is_in_use(&self, port: u16) -> bool {
        TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)).is_err()
    }
}

/// Fake probe reporting a fixed set of ports as bound. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FixedPortProbe {
    busy: Arc<RwLock<HashSet<u16>>>,
}

impl FixedPortProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(self, ports: impl IntoIterator<Item = u16>) -> Self {
        if let Ok(mut busy) = self.busy.write() {
            busy.extend(ports);
        }
        self
    }
}

impl PortProbe for FixedPortProbe {
    fn is_in_use(&self, port: u16) -> bool {
        self.busy.read().is_ok_and(|busy| busy.contains(&port))
    }
}
