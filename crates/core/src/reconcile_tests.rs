use super::*;
use crate::state::LockRecord;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn state_with(members: &[&str], record: Option<(u32, &[&str])>) -> SemaphoreState {
    SemaphoreState {
        members: set(members),
        lock_record: record.map(|(limit, holders)| LockRecord {
            limit,
            holders: set(holders),
        }),
        lock_version: if record.is_some() { 1 } else { 0 },
    }
}

#[test]
fn no_lock_record_admits_local_session() {
    let state = state_with(&[], None);
    let holders = reconcile(&state, &SessionId::new("me"), 3);
    assert_eq!(holders, set(&["me"]));
}

#[test]
fn dead_contenders_are_dropped() {
    // B's session died: still in the record, gone from members
    let state = state_with(&["A", "C"], Some((3, &["A", "B", "C"])));
    let holders = reconcile(&state, &SessionId::new("D"), 3);
    assert_eq!(holders, set(&["A", "C", "D"]));
}

#[test]
fn full_semaphore_returns_holders_unchanged() {
    let state = state_with(&["A", "B"], Some((2, &["A", "B"])));
    let holders = reconcile(&state, &SessionId::new("me"), 2);
    assert_eq!(holders, set(&["A", "B"]));
    assert!(!holders.contains("me"));
}

#[test]
fn existing_holder_stays_admitted() {
    let state = state_with(&["A", "B"], Some((2, &["A", "B"])));
    let holders = reconcile(&state, &SessionId::new("A"), 2);
    assert!(holders.contains("A"));
}

#[test]
fn contender_not_in_record_is_not_a_holder() {
    // Registered contenders alone never occupy slots
    let state = state_with(&["A", "B", "C"], Some((2, &["A", "B"])));
    let holders = reconcile(&state, &SessionId::new("C"), 2);
    assert_eq!(holders, set(&["A", "B"]));
}

#[test]
fn reconcile_is_deterministic_and_pure() {
    let state = state_with(&["A"], Some((3, &["A"])));
    let session = SessionId::new("B");
    let first = reconcile(&state, &session, 3);
    let second = reconcile(&state, &session, 3);
    assert_eq!(first, second);
    // The snapshot is untouched
    assert_eq!(state.members, set(&["A"]));
}

fn arb_session_id() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

fn arb_id_set(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(arb_session_id(), 0..max)
}

proptest! {
    // Capacity invariant: starting from any valid record (|holders| <= limit),
    // the reconciled set never exceeds the limit.
    #[test]
    fn reconciled_set_never_exceeds_limit(
        members in arb_id_set(8),
        holders in arb_id_set(8),
        limit in 1u32..6,
        local in arb_session_id(),
    ) {
        prop_assume!(holders.len() as u32 <= limit);
        let state = SemaphoreState {
            members,
            lock_record: Some(LockRecord { limit, holders }),
            lock_version: 1,
        };
        let reconciled = reconcile(&state, &SessionId::new(local), limit);
        prop_assert!(reconciled.len() as u32 <= limit);
    }

    #[test]
    fn reconciled_holders_are_live_or_local(
        members in arb_id_set(8),
        holders in arb_id_set(8),
        limit in 1u32..6,
        local in arb_session_id(),
    ) {
        prop_assume!(holders.len() as u32 <= limit);
        let state = SemaphoreState {
            members: members.clone(),
            lock_record: Some(LockRecord { limit, holders }),
            lock_version: 1,
        };
        let reconciled = reconcile(&state, &SessionId::new(local.clone()), limit);
        for holder in &reconciled {
            prop_assert!(members.contains(holder) || *holder == local);
        }
    }
}
