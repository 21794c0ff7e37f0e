// SPDX-License-Identifier: MIT

//! Snapshot decoding for semaphore state
//!
//! One consistent prefix read yields both the contender keys and the lock
//! record; decoding is pure so the reconciler can never mix members from
//! one read with a lock record from another.

use crate::error::SemaphoreError;
use crate::store::KvEntry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Wire shape of the lock record: `{"Limit": 3, "Holders": {"<id>": true}}`
///
/// Holders is a map for compatibility with other writers; only key presence
/// matters.
#[derive(Debug, Serialize, Deserialize)]
struct WireLockRecord {
    #[serde(rename = "Limit")]
    limit: u32,
    #[serde(rename = "Holders")]
    holders: BTreeMap<String, bool>,
}

/// The single shared lock record: configured limit plus current holder set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub limit: u32,
    pub holders: BTreeSet<String>,
}

impl LockRecord {
    /// Strict decode; any schema mismatch is corruption, not a degraded read
    pub fn decode(bytes: &[u8]) -> Result<Self, SemaphoreError> {
        let wire: WireLockRecord = serde_json::from_slice(bytes)
            .map_err(|e| SemaphoreError::Decode(e.to_string()))?;
        if wire.limit == 0 {
            return Err(SemaphoreError::Decode(
                "lock record limit must be greater than zero".to_string(),
            ));
        }
        if wire.holders.len() as u32 > wire.limit {
            return Err(SemaphoreError::Decode(format!(
                "lock record lists {} holders but limit is {}",
                wire.holders.len(),
                wire.limit
            )));
        }
        Ok(Self {
            limit: wire.limit,
            holders: wire.holders.into_keys().collect(),
        })
    }

    pub fn encode(limit: u32, holders: &BTreeSet<String>) -> Result<Vec<u8>, SemaphoreError> {
        let wire = WireLockRecord {
            limit,
            holders: holders.iter().map(|h| (h.clone(), true)).collect(),
        };
        serde_json::to_vec(&wire).map_err(|e| SemaphoreError::Decode(e.to_string()))
    }
}

/// Point-in-time view of a semaphore's keys
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemaphoreState {
    /// Session ids derived from contender keys present in the snapshot
    pub members: BTreeSet<String>,
    /// Decoded lock record, absent if never written
    pub lock_record: Option<LockRecord>,
    /// Change version of the lock key at read time; 0 if it does not exist
    pub lock_version: u64,
}

impl SemaphoreState {
    /// Decode one snapshot of the key prefix
    ///
    /// The lock record is separated from contender keys by exact key match;
    /// a member id is the final path segment of its contender key. An empty
    /// snapshot is the valid initial state.
    pub fn decode(entries: &[KvEntry], lock_key: &str) -> Result<Self, SemaphoreError> {
        let mut state = SemaphoreState::default();

        for entry in entries {
            if entry.key == lock_key {
                state.lock_record = Some(LockRecord::decode(&entry.value)?);
                state.lock_version = entry.modify_version;
            } else {
                let member = entry.key.rsplit('/').next().unwrap_or(&entry.key);
                state.members.insert(member.to_string());
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
