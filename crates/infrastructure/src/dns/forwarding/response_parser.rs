use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use labelns_domain::DomainError;
use std::net::IpAddr;
use tracing::debug;

/// The parts of an upstream answer the proxy handler cares about.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub addresses: Vec<IpAddr>,

    /// TTL of the first answer record, whatever its type.
    pub first_ttl: Option<u32>,

    pub rcode: ResponseCode,

    pub truncated: bool,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidUpstreamResponse(format!("failed to parse DNS response: {}", e))
        })?;

        let mut addresses = Vec::new();
        let mut first_ttl = None;

        for record in message.answers() {
            if first_ttl.is_none() {
                first_ttl = Some(record.ttl());
            }

            match record.data() {
                RData::A(a) => addresses.push(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => addresses.push(IpAddr::V6(aaaa.0)),
                _ => {}
            }
        }

        let response = DnsResponse {
            id: message.id(),
            addresses,
            first_ttl,
            rcode: message.response_code(),
            truncated: message.truncated(),
        };

        debug!(
            rcode = ?response.rcode,
            addresses = response.addresses.len(),
            truncated = response.truncated,
            "DNS response parsed"
        );

        Ok(response)
    }
}
