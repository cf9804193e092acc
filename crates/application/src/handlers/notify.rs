use async_trait::async_trait;
use labelns_domain::notify_event::is_valid_channel;
use labelns_domain::{DnsQuery, DomainError, NotifyEvent};
use std::sync::Arc;

use crate::pipeline::{Contribution, Handler, SharedLimiter, TokenStream};
use crate::ports::NotificationHub;

/// Wraps the next handler and reports what it answered to a channel.
///
/// Label form: `n-<channel>.<nested>`.
pub struct NotifyHandler {
    channel: String,
    nested: Option<Box<dyn Handler>>,
    hub: Option<Arc<dyn NotificationHub>>,
    limiter: SharedLimiter,
}

impl NotifyHandler {
    pub fn new(hub: Option<Arc<dyn NotificationHub>>, limiter: SharedLimiter) -> Self {
        Self {
            channel: String::new(),
            nested: None,
            hub,
            limiter,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    fn read_tokens(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        let channel = stream.next_value(self.name())?;
        if !is_valid_channel(&channel) {
            return Err(DomainError::InvalidChannel(channel));
        }
        self.channel = channel;

        self.nested = Some(stream.next_handler()?);
        Ok(())
    }

    fn publish(&self, event: NotifyEvent) {
        if let Some(hub) = &self.hub {
            hub.publish(&self.channel, event);
        }
    }
}

#[async_trait]
impl Handler for NotifyHandler {
    fn tag(&self) -> &'static str {
        "n"
    }

    fn name(&self) -> &'static str {
        "notify"
    }

    fn initialize(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        let result = self.read_tokens(stream);

        // Without a channel there is nowhere to report to.
        if let Err(err) = &result {
            if !self.channel.is_empty() {
                self.publish(NotifyEvent::failed(
                    stream.query_name(),
                    None,
                    stream.peer(),
                    err.to_string(),
                ));
            }
        }

        result
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        let Some(nested) = &self.nested else {
            return Ok(Contribution::pass());
        };

        let result = nested.handle(query).await;
        if self.hub.is_some() {
            match &result {
                Err(err) => self.publish(NotifyEvent::failed(
                    &query.name,
                    Some(query.record_type),
                    &query.peer,
                    err.to_string(),
                )),
                Ok(contribution) if contribution.records.is_empty() => {
                    self.publish(NotifyEvent::empty(query))
                }
                Ok(contribution) => {
                    for record in &contribution.records {
                        self.publish(NotifyEvent::answered(query, record));
                    }
                }
            }
        }

        result
    }

    /// The nested handler's limiter governs continuation.
    fn limiter(&self) -> &SharedLimiter {
        match &self.nested {
            Some(nested) => nested.limiter(),
            None => &self.limiter,
        }
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        if let Some(nested) = &mut self.nested {
            nested.set_limiter(Arc::clone(&limiter));
        }
        self.limiter = limiter;
    }

    fn describe(&self) -> String {
        match &self.nested {
            Some(nested) => format!("notify[{}]({})", self.channel, nested.describe()),
            None => self.name().to_string(),
        }
    }
}
