// SPDX-License-Identifier: MIT

//! Acquisition state machine
//!
//! One acquisition round is read → reconcile → CAS write. A conflict means
//! another participant changed the lock record first; a committed write that
//! does not include the local session means the semaphore is full. Both are
//! retried under the caller's wait policy, never surfaced as errors.

use crate::config::SemaphoreConfig;
use crate::error::SemaphoreError;
use crate::reconcile::reconcile;
use crate::state::{LockRecord, SemaphoreState};
use crate::store::{KvStore, SessionId, SessionProvider, StoreError};
use crate::wait::WaitPolicy;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Default contender key marker value
const DEFAULT_MARKER: &[u8] = b"none";

/// Outcome of one CAS write against the lock record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was written at the expected version
    Committed,
    /// Another participant wrote first; re-read and retry
    Conflict,
}

/// Outcome of one acquisition round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// The committed holder set includes the local session
    Admitted,
    /// The write committed but the semaphore is at capacity
    Blocked,
    /// The CAS precondition failed
    Conflicted,
}

/// Scoped handle for a held semaphore slot
///
/// Hand it back to [`Semaphore::release`]. Dropping it without releasing
/// leaks the slot until the session itself dies; reconciliation on other
/// participants then reclaims it.
#[derive(Debug)]
pub struct SemaphoreGuard {
    session: SessionId,
    service: String,
    released: bool,
}

impl SemaphoreGuard {
    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

impl Drop for SemaphoreGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(
                service = %self.service,
                session = %self.session,
                "semaphore guard dropped without release; slot held until session expiry"
            );
        }
    }
}

/// A distributed counting semaphore coordinated through a session-aware KV store
#[derive(Clone, Debug)]
pub struct Semaphore<S: KvStore> {
    store: S,
    session: SessionId,
    config: SemaphoreConfig,
}

impl<S: KvStore> Semaphore<S> {
    /// Build a semaphore around an existing session
    ///
    /// The session's liveness stays with whoever created it; this type never
    /// renews or destroys it.
    pub fn new(store: S, session: SessionId, config: SemaphoreConfig) -> Result<Self, SemaphoreError> {
        config.validate()?;
        Ok(Self {
            store,
            session,
            config,
        })
    }

    /// Create a fresh session from the provider, then build
    pub async fn start<P: SessionProvider>(
        provider: &P,
        store: S,
        config: SemaphoreConfig,
    ) -> Result<Self, SemaphoreError> {
        config.validate()?;
        let session = provider.create_session(&config.service).await?;
        Ok(Self {
            store,
            session,
            config,
        })
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn config(&self) -> &SemaphoreConfig {
        &self.config
    }

    /// Register this session as a contender with the default marker
    pub async fn register_contender(&self) -> Result<(), SemaphoreError> {
        self.register_contender_with(DEFAULT_MARKER).await
    }

    /// Register this session as a contender
    ///
    /// Writes `prefix + session_id` bound to the session, so the store drops
    /// the key when the session dies. Idempotent: re-registering overwrites
    /// the same key.
    pub async fn register_contender_with(&self, marker: &[u8]) -> Result<(), SemaphoreError> {
        if marker.is_empty() {
            return Err(SemaphoreError::InvalidConfiguration(
                "contender marker must not be empty".to_string(),
            ));
        }
        let key = self.config.contender_key(&self.session);
        let bound = self
            .store
            .put_with_session(&key, marker, &self.session)
            .await?;
        if !bound {
            return Err(SemaphoreError::Store(StoreError::SessionRejected(format!(
                "session {} could not bind contender key {}",
                self.session, key
            ))));
        }
        debug!(key = %key, session = %self.session, "registered contender");
        Ok(())
    }

    /// Fetch and decode one consistent snapshot of the key prefix
    pub async fn read_state(&self) -> Result<SemaphoreState, SemaphoreError> {
        let entries = self.store.get_prefix(&self.config.key_prefix).await?;
        SemaphoreState::decode(&entries, &self.config.lock_key)
    }

    /// CAS-write the lock record at the version observed by `read_state`
    ///
    /// Never retries internally; retry policy belongs to [`Semaphore::acquire`].
    pub async fn write_lock(
        &self,
        holders: &BTreeSet<String>,
        expected_version: u64,
    ) -> Result<WriteOutcome, SemaphoreError> {
        let value = LockRecord::encode(self.config.limit, holders)?;
        let committed = self
            .store
            .put_cas(&self.config.lock_key, &value, expected_version)
            .await?;
        Ok(if committed {
            WriteOutcome::Committed
        } else {
            WriteOutcome::Conflict
        })
    }

    /// Run one read → reconcile → write round
    pub async fn try_acquire(&self) -> Result<Attempt, SemaphoreError> {
        let state = self.read_state().await?;
        let holders = reconcile(&state, &self.session, self.config.limit);
        let admitted = holders.contains(&self.session.0);
        match self.write_lock(&holders, state.lock_version).await? {
            WriteOutcome::Committed if admitted => Ok(Attempt::Admitted),
            WriteOutcome::Committed => Ok(Attempt::Blocked),
            WriteOutcome::Conflict => Ok(Attempt::Conflicted),
        }
    }

    /// Block (await) until a slot is held or the wait policy gives up
    ///
    /// Registers the contender key, then loops acquisition rounds. Rounds
    /// that end in `Blocked` or `Conflicted` consult the wait policy; an
    /// exhausted budget surfaces as [`SemaphoreError::Timeout`].
    pub async fn acquire(&self, wait: &impl WaitPolicy) -> Result<SemaphoreGuard, SemaphoreError> {
        self.register_contender().await?;

        let mut attempt = 0u32;
        loop {
            match self.try_acquire().await? {
                Attempt::Admitted => {
                    info!(
                        service = %self.config.service,
                        session = %self.session,
                        "semaphore slot acquired"
                    );
                    return Ok(SemaphoreGuard {
                        session: self.session.clone(),
                        service: self.config.service.clone(),
                        released: false,
                    });
                }
                Attempt::Blocked => {
                    debug!(service = %self.config.service, "semaphore full, waiting for a slot");
                }
                Attempt::Conflicted => {
                    debug!(service = %self.config.service, "lock record changed concurrently, retrying");
                }
            }

            attempt += 1;
            match wait.next_delay(attempt) {
                Some(delay) if !delay.is_zero() => tokio::time::sleep(delay).await,
                Some(_) => {}
                None => {
                    return Err(SemaphoreError::Timeout {
                        service: self.config.service.clone(),
                    })
                }
            }
        }
    }

    /// Release a held slot
    ///
    /// Deletes the contender key, then makes one best-effort CAS write
    /// dropping the local session from the record. Losing that race is fine:
    /// with the contender key gone, the next reader's reconciliation drops
    /// us anyway.
    pub async fn release(&self, mut guard: SemaphoreGuard) -> Result<(), SemaphoreError> {
        self.store
            .delete(&self.config.contender_key(&self.session))
            .await?;

        let state = self.read_state().await?;
        if let Some(record) = &state.lock_record {
            if record.holders.contains(&self.session.0) {
                let mut holders: BTreeSet<String> = record
                    .holders
                    .intersection(&state.members)
                    .cloned()
                    .collect();
                holders.remove(&self.session.0);
                if self.write_lock(&holders, state.lock_version).await? == WriteOutcome::Conflict {
                    debug!(
                        service = %self.config.service,
                        "release lost the lock record race; next reader drops us"
                    );
                }
            }
        }

        guard.released = true;
        info!(
            service = %self.config.service,
            session = %self.session,
            "semaphore slot released"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
