use labelns_domain::{DnsQuery, DnsRecord, DomainError};
use std::fmt;
use tracing::debug;

use super::Handler;

/// Ordered handlers built for one name.
pub struct Pipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Pipeline {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Box<dyn Handler>] {
        &self.handlers
    }

    pub fn describe(&self) -> String {
        self.handlers
            .iter()
            .map(|h| h.describe())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Runs handlers in order and collects their records.
    ///
    /// A handler that passes never stops the run. After a handler answered,
    /// its limiter decides whether the next one gets a turn. The first error
    /// aborts the run.
    pub async fn execute(&self, query: &DnsQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let mut records = Vec::new();

        for handler in &self.handlers {
            let contribution = handler.handle(query).await?;
            if contribution.is_pass() {
                debug!(handler = handler.name(), name = %query.name, "handler passed");
                continue;
            }

            records.extend(contribution.records);
            if !handler.limiter().may_continue() {
                break;
            }
        }

        Ok(records)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pipeline").field(&self.describe()).finish()
    }
}
