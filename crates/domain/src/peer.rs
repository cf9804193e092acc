use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Udp,
    Tcp,
    Unix,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
            TransportKind::Unix => "unix",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a query came from. Unix socket peers carry no address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub transport: TransportKind,
    pub addr: Option<SocketAddr>,
}

impl PeerEndpoint {
    pub fn udp(addr: SocketAddr) -> Self {
        Self {
            transport: TransportKind::Udp,
            addr: Some(addr),
        }
    }

    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            transport: TransportKind::Tcp,
            addr: Some(addr),
        }
    }

    pub fn unix() -> Self {
        Self {
            transport: TransportKind::Unix,
            addr: None,
        }
    }

    /// Requester address, with IPv4-mapped IPv6 folded back to IPv4 so
    /// dual-stack listeners report what the client actually used.
    pub fn ip(&self) -> Option<IpAddr> {
        match self.transport {
            TransportKind::Udp | TransportKind::Tcp => self.addr.map(|a| a.ip().to_canonical()),
            TransportKind::Unix => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        self.addr.map(|a| a.port())
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            Some(addr) => write!(f, "{}://{}", self.transport, addr),
            None => write!(f, "{}://local", self.transport),
        }
    }
}
