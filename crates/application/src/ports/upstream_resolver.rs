use async_trait::async_trait;
use labelns_domain::{DomainError, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResolution {
    pub addresses: Arc<Vec<IpAddr>>,
    /// Seconds the answer stays valid, counted from now.
    pub ttl: u32,
    pub cache_hit: bool,
}

impl UpstreamResolution {
    pub fn new(addresses: Vec<IpAddr>, ttl: u32, cache_hit: bool) -> Self {
        Self {
            addresses: Arc::new(addresses),
            ttl,
            cache_hit,
        }
    }
}

#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    /// Resolve `name` (fully qualified) to addresses of `record_type`'s family.
    /// No retries: one exchange per call at most.
    async fn resolve(
        &self,
        record_type: RecordType,
        name: &str,
    ) -> Result<UpstreamResolution, DomainError>;
}
