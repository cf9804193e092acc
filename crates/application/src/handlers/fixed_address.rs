use async_trait::async_trait;
use labelns_domain::address_literal::parse_label_address;
use labelns_domain::{DnsQuery, DnsRecord, DomainError};
use std::net::IpAddr;
use tracing::debug;

use crate::pipeline::{Contribution, Handler, SharedLimiter, TokenStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn matches(&self, address: &IpAddr) -> bool {
        matches!(
            (self, address),
            (AddressFamily::V4, IpAddr::V4(_)) | (AddressFamily::V6, IpAddr::V6(_))
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }
}

/// Answers with the address literal that follows its tag.
pub struct FixedAddressHandler {
    family: AddressFamily,
    address: Option<IpAddr>,
    ttl: u32,
    limiter: SharedLimiter,
}

impl FixedAddressHandler {
    pub fn new(family: AddressFamily, ttl: u32, limiter: SharedLimiter) -> Self {
        Self {
            family,
            address: None,
            ttl,
            limiter,
        }
    }

    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }
}

#[async_trait]
impl Handler for FixedAddressHandler {
    fn tag(&self) -> &'static str {
        match self.family {
            AddressFamily::V4 => "4",
            AddressFamily::V6 => "6",
        }
    }

    fn name(&self) -> &'static str {
        match self.family {
            AddressFamily::V4 => "v4",
            AddressFamily::V6 => "v6",
        }
    }

    fn initialize(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        let literal = stream.next_raw()?;
        let address = parse_label_address(&literal)?;
        if !self.family.matches(&address) {
            return Err(DomainError::AddressFamilyMismatch {
                expected: self.family.as_str(),
                literal,
            });
        }

        self.address = Some(address);
        Ok(())
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        let Some(address) = self.address else {
            return Ok(Contribution::pass());
        };

        if !query.record_type.accepts(&address) || !self.limiter.record_use() {
            return Ok(Contribution::pass());
        }

        debug!(handler = self.name(), ip = %address, name = %query.name, "answering with literal");
        Ok(Contribution::answered(vec![DnsRecord::new(address, self.ttl)]))
    }

    fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        self.limiter = limiter;
    }

    fn describe(&self) -> String {
        match self.address {
            Some(address) => format!("{}({})", self.name(), address),
            None => self.name().to_string(),
        }
    }
}
