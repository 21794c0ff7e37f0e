// SPDX-License-Identifier: MIT

//! In-memory coordination store
//!
//! Backs the unit and scenario tests and doubles as a single-process store.
//! Failure modes (forced CAS conflicts, transport outage) are injectable so
//! the acquisition loop's retry paths can be exercised deterministically.

use super::{KvEntry, KvStore, SessionId, SessionProvider, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Entry {
    value: Vec<u8>,
    modify_version: u64,
    /// Session this key's liveness is bound to, if any
    session: Option<SessionId>,
}

#[derive(Debug, Default)]
struct State {
    keys: BTreeMap<String, Entry>,
    sessions: BTreeSet<SessionId>,
    next_version: u64,
    // Injectable failure modes
    forced_conflicts: u32,
    unavailable: bool,
}

/// In-memory [`KvStore`] + [`SessionProvider`]
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Expire a session, removing it and every key bound to it
    pub fn expire_session(&self, session: &SessionId) {
        let mut state = self.lock_state();
        state.sessions.remove(session);
        state
            .keys
            .retain(|_, entry| entry.session.as_ref() != Some(session));
    }

    /// Force the next `n` CAS writes to report a conflict
    pub fn fail_next_cas(&self, n: u32) {
        self.lock_state().forced_conflicts = n;
    }

    /// Simulate a transport outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock_state().unavailable = unavailable;
    }

    /// Number of keys currently stored under a prefix
    pub fn key_count(&self, prefix: &str) -> usize {
        self.lock_state()
            .keys
            .keys()
            .filter(|k| k.starts_with(prefix))
            .count()
    }

    fn check_available(state: &State) -> Result<(), StoreError> {
        if state.unavailable {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }

    fn bump_version(state: &mut State) -> u64 {
        state.next_version += 1;
        state.next_version
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put_with_session(
        &self,
        key: &str,
        value: &[u8],
        session: &SessionId,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock_state();
        Self::check_available(&state)?;
        if !state.sessions.contains(session) {
            return Ok(false);
        }
        let version = Self::bump_version(&mut state);
        state.keys.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                modify_version: version,
                session: Some(session.clone()),
            },
        );
        Ok(true)
    }

    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError> {
        let state = self.lock_state();
        Self::check_available(&state)?;
        Ok(state
            .keys
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| KvEntry {
                key: key.clone(),
                value: entry.value.clone(),
                modify_version: entry.modify_version,
            })
            .collect())
    }

    async fn put_cas(
        &self,
        key: &str,
        value: &[u8],
        expected_version: u64,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock_state();
        Self::check_available(&state)?;
        if state.forced_conflicts > 0 {
            state.forced_conflicts -= 1;
            return Ok(false);
        }
        let current_version = state.keys.get(key).map(|e| e.modify_version).unwrap_or(0);
        if current_version != expected_version {
            return Ok(false);
        }
        let version = Self::bump_version(&mut state);
        state.keys.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                modify_version: version,
                session: None,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.lock_state();
        Self::check_available(&state)?;
        state.keys.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for MemoryStore {
    async fn create_session(&self, _service: &str) -> Result<SessionId, StoreError> {
        let mut state = self.lock_state();
        Self::check_available(&state)?;
        let session = SessionId::new(Uuid::new_v4().to_string());
        state.sessions.insert(session.clone());
        Ok(session)
    }

    async fn destroy_session(&self, session: &SessionId) -> Result<(), StoreError> {
        {
            let state = self.lock_state();
            Self::check_available(&state)?;
        }
        self.expire_session(session);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
