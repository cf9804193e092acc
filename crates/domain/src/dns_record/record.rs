use super::RecordType;
use std::net::IpAddr;

/// One synthesized or proxied address answer. The owner name is the question
/// name, so only the data and TTL are carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub address: IpAddr,
    pub ttl: u32,
}

impl DnsRecord {
    pub fn new(address: IpAddr, ttl: u32) -> Self {
        Self { address, ttl }
    }

    pub fn record_type(&self) -> RecordType {
        RecordType::of_address(&self.address)
    }

    /// Record data in presentation format.
    pub fn data_text(&self) -> String {
        self.address.to_string()
    }
}
