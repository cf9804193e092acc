use labelns_domain::{DnsConfig, DomainError};
use std::collections::HashMap;
use std::sync::Arc;

use super::{Handler, SharedLimiter, UseBudget};
use crate::handlers;
use crate::ports::{NotificationHub, UpstreamResolver};

type HandlerFactory = Arc<dyn Fn(SharedLimiter) -> Box<dyn Handler> + Send + Sync>;

/// Collaborators handed to handler factories.
#[derive(Clone)]
pub struct HandlerContext {
    pub dns: Arc<DnsConfig>,
    /// `None` disables the proxy handler.
    pub upstream: Option<Arc<dyn UpstreamResolver>>,
    /// `None` keeps notify handlers silent.
    pub hub: Option<Arc<dyn NotificationHub>>,
}

impl HandlerContext {
    pub fn new(dns: Arc<DnsConfig>) -> Self {
        Self {
            dns,
            upstream: None,
            hub: None,
        }
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn UpstreamResolver>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_hub(mut self, hub: Arc<dyn NotificationHub>) -> Self {
        self.hub = Some(hub);
        self
    }
}

/// Maps label tags to handler factories. Filled once at startup.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<&'static str, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_handlers(context: &HandlerContext) -> Self {
        let mut registry = Self::new();
        handlers::register_builtin(&mut registry, context);
        registry
    }

    /// Registers `factory` under every tag in `tags`. Later registrations
    /// replace earlier ones.
    pub fn register<F>(&mut self, tags: &[&'static str], factory: F)
    where
        F: Fn(SharedLimiter) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        let factory: HandlerFactory = Arc::new(factory);
        for tag in tags {
            self.factories.insert(*tag, Arc::clone(&factory));
        }
    }

    /// Fresh, uninitialized handler. Each one gets its own single-use budget
    /// unless the variant brings its own limiter.
    pub fn create(&self, tag: &str) -> Result<Box<dyn Handler>, DomainError> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| DomainError::UnknownHandlerTag(tag.to_string()))?;
        Ok(factory(Arc::new(UseBudget::once())))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.factories.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}
