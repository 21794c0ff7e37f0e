// SPDX-License-Identifier: MIT

//! Coordination-service interfaces
//!
//! The semaphore only ever talks to the outside world through these traits:
//! a session provider that hands out liveness tokens, and a KV store with
//! session-bound writes, consistent prefix reads, and CAS writes. The store
//! is the sole serialization point between participants.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Unique identifier for a coordination-service session
///
/// Liveness is managed entirely by the session provider; this crate holds
/// the id but never renews or destroys the session on its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One key as returned by a snapshot read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: Vec<u8>,
    /// Store-assigned change version, the CAS precondition for the next write
    pub modify_version: u64,
}

/// Transport-level failure talking to the coordination service
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("session rejected: {0}")]
    SessionRejected(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Session-aware KV store
///
/// `put_cas` with `expected_version == 0` means "the key must not exist yet".
/// Both conditional puts report the condition outcome as a bool rather than
/// an error; `false` means the session binding or CAS precondition failed.
#[async_trait]
pub trait KvStore: Clone + Send + Sync + 'static {
    /// Write a key whose liveness is bound to a session
    async fn put_with_session(
        &self,
        key: &str,
        value: &[u8],
        session: &SessionId,
    ) -> Result<bool, StoreError>;

    /// Consistent recursive snapshot of every key under a prefix
    ///
    /// An absent prefix is the empty snapshot, not an error.
    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError>;

    /// Optimistic write; `false` means another writer got there first
    async fn put_cas(
        &self,
        key: &str,
        value: &[u8],
        expected_version: u64,
    ) -> Result<bool, StoreError>;

    /// Delete a key
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Provider of externally managed sessions
#[async_trait]
pub trait SessionProvider: Clone + Send + Sync + 'static {
    /// Create a session named after the service; the provider keeps it alive
    async fn create_session(&self, service: &str) -> Result<SessionId, StoreError>;

    /// Invalidate a session, releasing every key bound to it
    async fn destroy_session(&self, session: &SessionId) -> Result<(), StoreError>;
}
