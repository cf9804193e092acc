use async_trait::async_trait;
use labelns_domain::{DnsQuery, DnsRecord, DomainError};

use super::{SharedLimiter, TokenStream};

/// What a handler added to an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contribution {
    pub records: Vec<DnsRecord>,
    passed: bool,
}

impl Contribution {
    /// The handler took its turn. Records may still be empty.
    pub fn answered(records: Vec<DnsRecord>) -> Self {
        Self {
            records,
            passed: false,
        }
    }

    /// The handler did not apply (wrong family, exhausted limiter, upstream
    /// failure). The runner always moves on.
    pub fn pass() -> Self {
        Self {
            records: Vec::new(),
            passed: true,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.passed
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    /// Short tag used in labels.
    fn tag(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Consumes the tokens this handler needs. Called once, right after the
    /// handler's tag was read.
    fn initialize(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError>;

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError>;

    fn limiter(&self) -> &SharedLimiter;

    fn set_limiter(&mut self, limiter: SharedLimiter);

    /// Compact rendering for logs, e.g. `v6(2001:db8::1)`.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}
