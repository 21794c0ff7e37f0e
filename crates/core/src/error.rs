// SPDX-License-Identifier: MIT

//! Error taxonomy for semaphore operations
//!
//! Only fatal or caller-visible conditions live here. CAS conflicts and
//! capacity-exceeded rounds are control flow inside the acquisition loop
//! (`Attempt` in the semaphore module), never errors.

use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced across the semaphore boundary
#[derive(Debug, Error)]
pub enum SemaphoreError {
    /// Malformed configuration, reported immediately and never retried
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The lock record could not be decoded; indicates external corruption
    /// or an incompatible writer
    #[error("lock record decode failed: {0}")]
    Decode(String),

    /// The caller-supplied wait policy ran out of attempts before admission
    #[error("semaphore '{service}' not acquired within retry budget")]
    Timeout { service: String },

    /// Transport-level failure talking to the coordination service
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
