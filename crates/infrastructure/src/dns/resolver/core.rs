use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::transport::DnsTransport;
use async_trait::async_trait;
use labelns_application::ports::{UpstreamResolution, UpstreamResolver};
use labelns_domain::{DomainError, RecordType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Sends one query per resolution to the configured upstream. No retries,
/// no fallback servers.
pub struct CoreResolver {
    transport: Arc<dyn DnsTransport>,
    query_timeout: Duration,
}

impl CoreResolver {
    pub fn new(transport: Arc<dyn DnsTransport>) -> Self {
        info!(
            protocol = transport.protocol_name(),
            timeout_ms = DEFAULT_QUERY_TIMEOUT.as_millis() as u64,
            "Core upstream resolver created"
        );

        Self {
            transport,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }
}

#[async_trait]
impl UpstreamResolver for CoreResolver {
    async fn resolve(
        &self,
        record_type: RecordType,
        name: &str,
    ) -> Result<UpstreamResolution, DomainError> {
        let record_type = match record_type {
            RecordType::ANY => RecordType::A,
            other => other,
        };

        debug!(
            name = %name,
            record_type = %record_type,
            "CoreResolver: performing upstream query"
        );

        let (id, query_bytes) = MessageBuilder::build_query(name, record_type)?;
        let response = self
            .transport
            .send(&query_bytes, self.query_timeout)
            .await?;
        let parsed = ResponseParser::parse(&response.bytes)?;

        if parsed.id != id {
            return Err(DomainError::InvalidUpstreamResponse(format!(
                "response id {} does not match query id {}",
                parsed.id, id
            )));
        }

        if parsed.is_nxdomain() {
            return Err(DomainError::EmptyUpstreamAnswer(name.to_string()));
        }
        if parsed.is_server_error() {
            return Err(DomainError::InvalidUpstreamResponse(format!(
                "upstream answered {} for {}",
                parsed.rcode, name
            )));
        }
        if parsed.truncated {
            return Err(DomainError::InvalidUpstreamResponse(format!(
                "truncated answer for {}",
                name
            )));
        }

        let Some(ttl) = parsed.first_ttl else {
            return Err(DomainError::EmptyUpstreamAnswer(name.to_string()));
        };

        let addresses: Vec<_> = parsed
            .addresses
            .into_iter()
            .filter(|address| record_type.accepts(address))
            .collect();

        debug!(
            name = %name,
            record_type = %record_type,
            addresses = addresses.len(),
            ttl,
            protocol = response.protocol_used,
            "Upstream answer received"
        );

        Ok(UpstreamResolution::new(addresses, ttl, false))
    }
}
