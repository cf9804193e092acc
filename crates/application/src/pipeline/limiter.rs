use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Gate consulted on every activation of a handler.
///
/// Handlers call [`record_use`](UsageLimiter::record_use) before answering;
/// only the pipeline runner calls [`may_continue`](UsageLimiter::may_continue).
pub trait UsageLimiter: Send + Sync + fmt::Debug {
    /// Counts an activation. `false` means the handler must not answer.
    fn record_use(&self) -> bool;

    /// Whether the runner moves on to the next handler after this one answered.
    fn may_continue(&self) -> bool;
}

pub type SharedLimiter = Arc<dyn UsageLimiter>;

/// Fixed number of activations, then refuses. Stops the pipeline.
#[derive(Debug)]
pub struct UseBudget {
    remaining: AtomicU32,
}

impl UseBudget {
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: AtomicU32::new(budget),
        }
    }

    pub fn once() -> Self {
        Self::new(1)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }
}

impl UsageLimiter for UseBudget {
    fn record_use(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    fn may_continue(&self) -> bool {
        false
    }
}

/// Never refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unlimited {
    fan_out: bool,
}

impl Unlimited {
    /// Answers every time and ends the pipeline.
    pub fn stop() -> Self {
        Self { fan_out: false }
    }

    /// Answers every time and lets the following handlers answer too.
    pub fn fan_out() -> Self {
        Self { fan_out: true }
    }
}

impl UsageLimiter for Unlimited {
    fn record_use(&self) -> bool {
        true
    }

    fn may_continue(&self) -> bool {
        self.fan_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_refuses_after_exhaustion() {
        let limiter = UseBudget::new(2);
        assert!(limiter.record_use());
        assert!(limiter.record_use());
        assert!(!limiter.record_use());
        assert_eq!(limiter.remaining(), 0);
        assert!(!limiter.may_continue());
    }

    #[test]
    fn test_unlimited_flavours() {
        assert!(Unlimited::stop().record_use());
        assert!(!Unlimited::stop().may_continue());
        assert!(Unlimited::fan_out().may_continue());
    }
}
