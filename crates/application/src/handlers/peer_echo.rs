use async_trait::async_trait;
use labelns_domain::{DnsQuery, DnsRecord, DomainError};
use std::sync::Arc;
use tracing::debug;

use crate::pipeline::{Contribution, Handler, SharedLimiter, TokenStream, Unlimited};

/// Answers with the requester's own address.
pub struct PeerEchoHandler {
    ttl: u32,
    limiter: SharedLimiter,
}

impl PeerEchoHandler {
    pub fn new(ttl: u32) -> Self {
        Self {
            ttl,
            limiter: Arc::new(Unlimited::stop()),
        }
    }
}

#[async_trait]
impl Handler for PeerEchoHandler {
    fn tag(&self) -> &'static str {
        "lo"
    }

    fn name(&self) -> &'static str {
        "loopback"
    }

    fn initialize(&mut self, _stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        let address = query
            .peer
            .ip()
            .ok_or(DomainError::UnsupportedPeer(query.peer.transport.as_str()))?;

        if !self.limiter.record_use() {
            return Ok(Contribution::pass());
        }

        debug!(handler = self.name(), ip = %address, name = %query.name, "echoing peer address");
        Ok(Contribution::answered(vec![DnsRecord::new(address, self.ttl)]))
    }

    fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        self.limiter = limiter;
    }
}
