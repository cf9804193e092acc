use labelns_domain::{DomainError, PeerEndpoint};
use std::sync::Arc;

use super::{Handler, HandlerRegistry};

/// Cursor over the labels left once the zone is stripped.
///
/// A label read as a handler tag is split at its first `-`; the remainder is
/// held back and returned by the next value read. `6-2001-db8--1` and
/// `6.2001-db8--1` therefore read the same. The stream never rewinds.
pub struct TokenStream<'a> {
    labels: Vec<String>,
    cursor: usize,
    pending: Option<String>,
    query_name: Arc<str>,
    peer: PeerEndpoint,
    registry: &'a HandlerRegistry,
}

impl<'a> TokenStream<'a> {
    pub fn new(
        relative_name: &str,
        query_name: Arc<str>,
        peer: PeerEndpoint,
        registry: &'a HandlerRegistry,
    ) -> Self {
        let labels = if relative_name.is_empty() {
            Vec::new()
        } else {
            relative_name.split('.').map(str::to_string).collect()
        };

        Self {
            labels,
            cursor: 0,
            pending: None,
            query_name,
            peer,
            registry,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.cursor >= self.labels.len()
    }

    fn next_label(&mut self) -> Option<String> {
        let label = self.labels.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(label)
    }

    /// Reads a handler tag. Fails if the previous handler left its value unread.
    pub fn next_tag(&mut self) -> Result<String, DomainError> {
        if let Some(value) = self.pending.take() {
            return Err(DomainError::UnconsumedValue(value));
        }

        let label = self.next_label().ok_or(DomainError::UnexpectedEndOfInput)?;
        match label.split_once('-') {
            Some((tag, value)) => {
                self.pending = Some(value.to_string());
                Ok(tag.to_string())
            }
            None => Ok(label),
        }
    }

    pub fn next_raw(&mut self) -> Result<String, DomainError> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        self.next_label().ok_or(DomainError::UnexpectedEndOfInput)
    }

    /// Like [`next_raw`](Self::next_raw) but rejects empty values.
    pub fn next_value(&mut self, owner: &'static str) -> Result<String, DomainError> {
        let value = self.next_raw()?;
        if value.is_empty() {
            return Err(DomainError::EmptyValue(owner));
        }
        Ok(value)
    }

    /// Everything left, labels unsplit. Leaves the stream exhausted.
    pub fn rest_values(&mut self) -> Vec<String> {
        let mut values: Vec<String> = self.pending.take().into_iter().collect();
        while let Some(label) = self.next_label() {
            values.push(label);
        }
        values
    }

    /// Reads a tag and builds the handler it names, recursively.
    pub fn next_handler(&mut self) -> Result<Box<dyn Handler>, DomainError> {
        let tag = self.next_tag()?;
        let registry = self.registry;
        let mut handler = registry.create(&tag)?;
        handler.initialize(self)?;
        Ok(handler)
    }

    pub fn rest_handlers(&mut self) -> Result<Vec<Box<dyn Handler>>, DomainError> {
        let mut handlers = Vec::new();
        while !self.is_exhausted() {
            handlers.push(self.next_handler()?);
        }
        Ok(handlers)
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    pub fn peer(&self) -> &PeerEndpoint {
        &self.peer
    }
}
