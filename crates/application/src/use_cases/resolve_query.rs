use labelns_domain::{DnsConfig, DnsQuery, DnsRecord, DomainError, ZoneSet};
use std::sync::Arc;
use tracing::debug;

use crate::pipeline::{HandlerRegistry, PipelineBuilder, PipelineCache};

/// Routes a query to its zone, builds or reuses the pipeline for the
/// zone-relative name, and runs it.
pub struct ResolveQueryUseCase {
    dns: Arc<DnsConfig>,
    zones: ZoneSet,
    builder: PipelineBuilder,
    pipelines: PipelineCache,
}

impl ResolveQueryUseCase {
    pub fn new(dns: Arc<DnsConfig>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            zones: ZoneSet::new(&dns.zones),
            builder: PipelineBuilder::new(registry),
            pipelines: PipelineCache::new(dns.cache_size, dns.sticky_ttl()),
            dns,
        }
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn is_authoritative(&self, name: &str) -> bool {
        self.zones.match_name(name).is_some()
    }

    pub fn cached_pipelines(&self) -> usize {
        self.pipelines.len()
    }

    /// Records for `query`. An empty list means an empty NOERROR answer.
    ///
    /// Names outside every zone fail with [`DomainError::NotAuthoritative`];
    /// grammar and handler errors are passed through unchanged.
    pub async fn execute(&self, query: &DnsQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let zone = self
            .zones
            .match_name(&query.name)
            .ok_or_else(|| DomainError::NotAuthoritative(query.name.to_string()))?;

        let pipeline = self.pipelines.get_or_build(zone.relative, || {
            self.builder
                .build(zone.relative, Arc::clone(&query.name), query.peer)
        })?;

        let mut records = pipeline.execute(query).await?;
        let fallback = records.is_empty() && self.dns.use_default;
        if fallback {
            records = self
                .dns
                .default_addresses(query.record_type)
                .into_iter()
                .map(|address| DnsRecord::new(address, self.dns.ttl))
                .collect();
        }

        debug!(
            name = %query.name,
            record_type = %query.record_type,
            peer = %query.peer,
            zone = %zone.zone,
            pipeline = %pipeline.describe(),
            answers = records.len(),
            fallback,
            "query resolved"
        );

        Ok(records)
    }
}
