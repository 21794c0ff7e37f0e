// SPDX-License-Identifier: MIT

//! Semaphore configuration
//!
//! Defaults follow the conventional Consul layout: contender keys and the
//! lock record live under `service/<name>/lock/`, with the lock record at
//! the well-known `.lock` key inside that prefix.

use crate::error::SemaphoreError;
use crate::store::SessionId;
use crate::wait::FixedInterval;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Semaphore configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemaphoreConfig {
    /// Service name identifying this semaphore
    pub service: String,
    /// Number of participants that can hold the semaphore at once
    pub limit: u32,
    /// Key prefix holding contender keys and the lock record
    pub key_prefix: String,
    /// Key of the single shared lock record
    pub lock_key: String,
    /// How long to wait between acquisition rounds
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,
    /// Whether `lock_key` was set explicitly (a custom prefix then leaves it alone)
    #[serde(skip)]
    explicit_lock_key: bool,
}

impl SemaphoreConfig {
    pub fn new(service: impl Into<String>, limit: u32) -> Self {
        let service = service.into();
        let key_prefix = format!("service/{}/lock/", service);
        let lock_key = format!("{}.lock", key_prefix);
        Self {
            service,
            limit,
            key_prefix,
            lock_key,
            retry_interval: Duration::from_secs(1),
            explicit_lock_key: false,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        if !self.explicit_lock_key {
            self.lock_key = format!("{}.lock", prefix);
        }
        self.key_prefix = prefix;
        self
    }

    pub fn with_lock_key(mut self, lock_key: impl Into<String>) -> Self {
        self.lock_key = lock_key.into();
        self.explicit_lock_key = true;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Check the configuration for fatal mistakes
    pub fn validate(&self) -> Result<(), SemaphoreError> {
        if self.service.trim().is_empty() {
            return Err(SemaphoreError::InvalidConfiguration(
                "service name must not be empty".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(SemaphoreError::InvalidConfiguration(
                "limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The contender key registered for a session under this semaphore
    pub fn contender_key(&self, session: &SessionId) -> String {
        format!("{}{}", self.key_prefix, session)
    }

    /// A wait policy retrying at `retry_interval` until admitted
    pub fn wait_policy(&self) -> FixedInterval {
        FixedInterval::unbounded(self.retry_interval)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
