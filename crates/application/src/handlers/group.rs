use async_trait::async_trait;
use labelns_domain::{DnsQuery, DnsRecord, DomainError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::pipeline::{Contribution, Handler, Pipeline, SharedLimiter, TokenStream, Unlimited};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// One nested handler per query, in turn (`l`).
    RoundRobin,
    /// Every nested handler contributes to the same answer (`m`).
    FanOut,
}

/// Runs all remaining handlers as a nested pipeline under a shared policy.
pub struct GroupHandler {
    mode: GroupMode,
    inner: Pipeline,
    /// Next nested handler to try in round robin mode.
    cursor: AtomicUsize,
    limiter: SharedLimiter,
}

impl GroupHandler {
    pub fn new(mode: GroupMode) -> Self {
        Self {
            mode,
            inner: Pipeline::new(Vec::new()),
            cursor: AtomicUsize::new(0),
            limiter: Arc::new(Unlimited::stop()),
        }
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// Tries the nested handlers starting at the cursor. A handler that
    /// passes hands the turn on; the cursor then moves past the one that
    /// answered, or by one when all of them passed.
    async fn next_in_turn(&self, query: &DnsQuery) -> Result<Vec<DnsRecord>, DomainError> {
        let handlers = self.inner.handlers();
        let size = handlers.len();
        if size == 0 {
            return Ok(Vec::new());
        }

        let start = self.cursor.load(Ordering::Acquire) % size;
        for offset in 0..size {
            let index = (start + offset) % size;
            let contribution = handlers[index].handle(query).await?;
            if !contribution.is_pass() {
                self.cursor.store((index + 1) % size, Ordering::Release);
                return Ok(contribution.records);
            }
        }

        self.cursor.store((start + 1) % size, Ordering::Release);
        Ok(Vec::new())
    }
}

#[async_trait]
impl Handler for GroupHandler {
    fn tag(&self) -> &'static str {
        match self.mode {
            GroupMode::RoundRobin => "l",
            GroupMode::FanOut => "m",
        }
    }

    fn name(&self) -> &'static str {
        match self.mode {
            GroupMode::RoundRobin => "loop",
            GroupMode::FanOut => "multi",
        }
    }

    fn initialize(&mut self, stream: &mut TokenStream<'_>) -> Result<(), DomainError> {
        let mut nested = stream.rest_handlers()?;
        if nested.is_empty() {
            return Err(DomainError::UnexpectedEndOfInput);
        }

        let shared: SharedLimiter = match self.mode {
            GroupMode::RoundRobin => Arc::new(Unlimited::stop()),
            GroupMode::FanOut => Arc::new(Unlimited::fan_out()),
        };
        for handler in nested.iter_mut() {
            handler.set_limiter(Arc::clone(&shared));
        }

        self.inner = Pipeline::new(nested);
        Ok(())
    }

    async fn handle(&self, query: &DnsQuery) -> Result<Contribution, DomainError> {
        if !self.limiter.record_use() {
            return Ok(Contribution::pass());
        }

        let records = match self.mode {
            GroupMode::RoundRobin => self.next_in_turn(query).await?,
            GroupMode::FanOut => self.inner.execute(query).await?,
        };
        if records.is_empty() {
            return Ok(Contribution::pass());
        }
        Ok(Contribution::answered(records))
    }

    fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    fn set_limiter(&mut self, limiter: SharedLimiter) {
        self.limiter = limiter;
    }

    fn describe(&self) -> String {
        format!("{}[{}]", self.name(), self.inner.describe())
    }
}
