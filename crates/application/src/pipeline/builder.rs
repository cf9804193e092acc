use labelns_domain::{DomainError, PeerEndpoint};
use std::sync::Arc;

use super::{HandlerRegistry, Pipeline, TokenStream};
use crate::handlers::DEFAULT_TAG;

pub struct PipelineBuilder {
    registry: Arc<HandlerRegistry>,
}

impl PipelineBuilder {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the pipeline for a zone-relative name. The apex (no labels)
    /// gets the default handler alone. Any grammar error fails the whole build.
    pub fn build(
        &self,
        relative_name: &str,
        query_name: Arc<str>,
        peer: PeerEndpoint,
    ) -> Result<Pipeline, DomainError> {
        let mut stream = TokenStream::new(relative_name, query_name, peer, &self.registry);
        let mut handlers = stream.rest_handlers()?;

        if handlers.is_empty() {
            let mut fallback = self.registry.create(DEFAULT_TAG)?;
            fallback.initialize(&mut stream)?;
            handlers.push(fallback);
        }

        Ok(Pipeline::new(handlers))
    }
}
