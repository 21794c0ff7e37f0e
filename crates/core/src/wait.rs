// SPDX-License-Identifier: MIT

//! Wait policies for the acquisition loop
//!
//! The retry interval is an injected, testable policy rather than a
//! hardcoded sleep. Returning `None` ends the acquisition with a timeout.

use std::time::Duration;

/// Decides how long to wait before retry round `attempt` (1-based)
pub trait WaitPolicy: Send + Sync {
    /// `None` means the retry budget is exhausted
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

/// Fixed interval between rounds, optionally bounded by an attempt count
///
/// An unbounded policy is a deliberate caller choice, not a default.
#[derive(Clone, Debug)]
pub struct FixedInterval {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl FixedInterval {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }

    /// Retry forever at the given interval
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }
}

impl WaitPolicy for FixedInterval {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt > max => None,
            _ => Some(self.interval),
        }
    }
}

/// Zero-delay policy with a bounded attempt count, for tests
#[derive(Clone, Debug)]
pub struct NoWait {
    max_attempts: u32,
}

impl NoWait {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl WaitPolicy for NoWait {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (attempt <= self.max_attempts).then_some(Duration::ZERO)
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
