// SPDX-License-Identifier: MIT

//! Holder set reconciliation
//!
//! Pure function of one snapshot. Intersecting recorded holders with the
//! live member set is what makes the semaphore self-healing: a holder whose
//! session died loses its contender key, so the next reconciliation drops
//! it without any external cleanup.

use crate::state::SemaphoreState;
use crate::store::SessionId;
use std::collections::BTreeSet;

/// Compute the authoritative holder set for one acquisition round
///
/// Returns the recorded holders still registered as contenders, extended
/// with `local_session` when capacity remains. The local session missing
/// from the result means "not admitted this round", not an error.
pub fn reconcile(
    state: &SemaphoreState,
    local_session: &SessionId,
    limit: u32,
) -> BTreeSet<String> {
    let mut active: BTreeSet<String> = match &state.lock_record {
        Some(record) => record
            .holders
            .intersection(&state.members)
            .cloned()
            .collect(),
        None => BTreeSet::new(),
    };

    if (active.len() as u32) < limit {
        active.insert(local_session.0.clone());
    }

    active
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
