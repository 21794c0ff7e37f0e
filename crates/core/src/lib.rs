// SPDX-License-Identifier: MIT

//! sluice-core: distributed counting semaphore over a session-aware KV store
//!
//! This crate provides:
//! - Pure snapshot decoding and holder-set reconciliation
//! - An acquisition state machine with CAS-based optimistic writes
//! - Store and session traits for the coordination service
//! - An in-memory store for tests and single-process use
//!
//! At most `limit` participants hold a named semaphore at once; the only
//! shared state between them is the coordination service. Holders whose
//! sessions die are reclaimed by reconciliation on the next reader's pass.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod reconcile;
pub mod semaphore;
pub mod state;
pub mod store;
pub mod wait;

// Re-exports
pub use config::SemaphoreConfig;
pub use error::SemaphoreError;
pub use reconcile::reconcile;
pub use semaphore::{Attempt, Semaphore, SemaphoreGuard, WriteOutcome};
pub use state::{LockRecord, SemaphoreState};
pub use store::{KvEntry, KvStore, MemoryStore, SessionId, SessionProvider, StoreError};
pub use wait::{FixedInterval, NoWait, WaitPolicy};
