use async_trait::async_trait;
use labelns_domain::{DnsConfig, DnsQuery, DnsRecord, DomainError};
use std::sync::Arc;

use crate::pipeline::{Contribution, Handler, SharedLimiter, TokenStream, Unlimited};

/// Answers with the configured default address for the query type.
pub struct DefaultHandler {
    dns: Arc<DnsConfig>,
    limiter: SharedLimiter,
}

impl DefaultHandler {
    pub fn new(dns: Arc<DnsConfig>) -> Self {
        Self {
            dns,
            limiter: Arc::new(Unlimited::stop()),
        }
    }
}

#[async_trait]
impl Handler for DefaultHandler {
    fn tag(&self) -> &'static str {
        "d"
    }

    fn name(&self) -> &'static str {
        "default"
    }

    fn initialize(&mut self, _stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        if !self.limiter.record_use() {
            return Ok(Contribution::pass());
        }

        let records = self
            .dns
            .default_addresses(query.record_type)
            .into_iter()
            .map(|address| DnsRecord::new(address, self.dns.ttl))
            .collect();
        Ok(Contribution::answered(records))
    }

    fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        self.limiter = limiter;
    }
}
