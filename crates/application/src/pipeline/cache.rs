use labelns_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::Pipeline;
use crate::cache::ExpiringLru;

/// Built pipelines by zone-relative name, kept for the sticky TTL.
pub struct PipelineCache {
    entries: ExpiringLru<Arc<str>, Arc<Pipeline>>,
    sticky_ttl: Duration,
}

impl PipelineCache {
    pub fn new(capacity: usize, sticky_ttl: Duration) -> Self {
        Self {
            entries: ExpiringLru::new(capacity),
            sticky_ttl,
        }
    }

    /// Cached pipeline for `key`, or a freshly built one.
    ///
    /// `build` runs without holding the cache lock, so concurrent misses may
    /// each build; the last insert wins and every caller gets a complete
    /// pipeline. Failed builds are not cached.
    pub fn get_or_build<F>(&self, key: &str, build: F) -> Result<Arc<Pipeline>, DomainError>
    where
        F: FnOnce() -> Result<Pipeline, DomainError>,
    {
        if let Some(pipeline) = self.entries.get(key) {
            return Ok(pipeline);
        }

        let pipeline = Arc::new(build()?);
        if self
            .entries
            .insert(Arc::from(key), Arc::clone(&pipeline), self.sticky_ttl)
        {
            debug!(key = %key, "pipeline cache full, evicted least recently used entry");
        }
        Ok(pipeline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sticky_ttl(&self) -> Duration {
        self.sticky_ttl
    }
}
