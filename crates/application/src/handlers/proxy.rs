use async_trait::async_trait;
use labelns_domain::dns_query::canonical_name;
use labelns_domain::{DnsQuery, DnsRecord, DomainError, RecordType};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::pipeline::{Contribution, Handler, SharedLimiter, TokenStream};
use crate::ports::UpstreamResolver;

/// Answers with what the upstream resolver returns for the host spelled by
/// the remaining labels: `p.www.example.org.<zone>`.
pub struct ProxyHandler {
    target: String,
    resolver: Option<Arc<dyn UpstreamResolver>>,
    limiter: SharedLimiter,
}

impl ProxyHandler {
    pub fn new(resolver: Option<Arc<dyn UpstreamResolver>>, limiter: SharedLimiter) -> Self {
        Self {
            target: String::new(),
            resolver,
            limiter,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl Handler for ProxyHandler {
    fn tag(&self) -> &'static str {
        "p"
    }

    fn name(&self) -> &'static str {
        "proxy"
    }

    fn initialize(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        if self.resolver.is_none() {
            return Err(DomainError::ProxyDisabled);
        }

        let labels = stream.rest_values();
        if labels.is_empty() {
            return Err(DomainError::UnexpectedEndOfInput);
        }
        if labels.iter().any(|label| label.is_empty()) {
            return Err(DomainError::EmptyValue(self.name()));
        }

        self.target = canonical_name(&labels.join("."));
        Ok(())
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        let Some(resolver) = &self.resolver else {
            return Err(DomainError::ProxyDisabled);
        };

        if !self.limiter.record_use() {
            return Ok(Contribution::pass());
        }

        let record_type = match query.record_type {
            RecordType::ANY => RecordType::A,
            other => other,
        };

        match resolver.resolve(record_type, &self.target).await {
            Ok(resolution) => {
                debug!(
                    handler = self.name(),
                    target = %self.target,
                    addresses = resolution.addresses.len(),
                    cache_hit = resolution.cache_hit,
                    "proxied upstream answer"
                );
                let records = resolution
                    .addresses
                    .iter()
                    .filter(|address| record_type.accepts(address))
                    .map(|address| DnsRecord::new(*address, resolution.ttl))
                    .collect();
                Ok(Contribution::answered(records))
            }
            Err(err) => {
                warn!(error = %err, target = %self.target, "upstream resolution failed");
                Ok(Contribution::pass())
            }
        }
    }

    fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        self.limiter = limiter;
    }

    fn describe(&self) -> String {
        format!("proxy({})", self.target)
    }
}
