use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use crate::RecordType;

/// Settings for answer synthesis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Zones this server is authoritative for, matched most specific first.
    #[serde(default = "default_zones")]
    pub zones: Vec<String>,

    #[serde(default = "default_ipv4")]
    pub ipv4: Ipv4Addr,

    #[serde(default = "default_ipv6")]
    pub ipv6: Ipv6Addr,

    /// TTL of synthesized records.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Lifetime of a built pipeline, independent of the record TTL.
    #[serde(default = "default_sticky_ttl")]
    pub sticky_ttl_secs: u64,

    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Answer with the default address when a pipeline produced nothing.
    #[serde(default = "default_true")]
    pub use_default: bool,
}

impl DnsConfig {
    pub fn sticky_ttl(&self) -> Duration {
        Duration::from_secs(self.sticky_ttl_secs)
    }

    /// Default addresses for a query type. `ANY` gets both families.
    pub fn default_addresses(&self, record_type: RecordType) -> Vec<IpAddr> {
        match record_type {
            RecordType::A => vec![IpAddr::V4(self.ipv4)],
            RecordType::AAAA => vec![IpAddr::V6(self.ipv6)],
            RecordType::ANY => vec![IpAddr::V4(self.ipv4), IpAddr::V6(self.ipv6)],
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            zones: default_zones(),
            ipv4: default_ipv4(),
            ipv6: default_ipv6(),
            ttl: default_ttl(),
            sticky_ttl_secs: default_sticky_ttl(),
            cache_size: default_cache_size(),
            use_default: true,
        }
    }
}

fn default_zones() -> Vec<String> {
    vec![".".to_string()]
}

fn default_ipv4() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

fn default_ipv6() -> Ipv6Addr {
    Ipv6Addr::LOCALHOST
}

fn default_ttl() -> u32 {
    60
}

fn default_sticky_ttl() -> u64 {
    30
}

fn default_cache_size() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}
