use async_trait::async_trait;
use labelns_application::cache::ExpiringLru;
use labelns_application::ports::{UpstreamResolution, UpstreamResolver};
use labelns_domain::{DomainError, RecordType};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type ResolutionKey = (RecordType, String);

/// Keeps upstream answers for as long as their TTL allows.
pub struct CachedResolver {
    inner: Arc<dyn UpstreamResolver>,
    cache: ExpiringLru<ResolutionKey, Arc<Vec<IpAddr>>>,
}

impl CachedResolver {
    pub fn new(inner: Arc<dyn UpstreamResolver>, capacity: usize) -> Self {
        Self {
            inner,
            cache: ExpiringLru::new(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn cache_key(record_type: RecordType, name: &str) -> ResolutionKey {
        let record_type = match record_type {
            RecordType::ANY => RecordType::A,
            other => other,
        };
        (record_type, name.to_ascii_lowercase())
    }
}

#[async_trait]
impl UpstreamResolver for CachedResolver {
    async fn resolve(
        &self,
        record_type: RecordType,
        name: &str,
    ) -> Result<UpstreamResolution, DomainError> {
        let key = Self::cache_key(record_type, name);

        if let Some((addresses, remaining)) = self.cache.get_with_ttl(&key) {
            debug!(name = %name, record_type = %record_type, "Cache HIT");
            return Ok(UpstreamResolution {
                addresses,
                ttl: remaining.as_secs() as u32,
                cache_hit: true,
            });
        }

        let resolution = self.inner.resolve(record_type, name).await?;

        if resolution.ttl > 0 {
            let evicted = self.cache.insert(
                key,
                Arc::clone(&resolution.addresses),
                Duration::from_secs(u64::from(resolution.ttl)),
            );
            debug!(
                name = %name,
                record_type = %record_type,
                ttl = resolution.ttl,
                evicted,
                "Cache MISS, stored upstream answer"
            );
        }

        Ok(resolution)
    }
}
