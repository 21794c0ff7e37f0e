use super::*;

#[tokio::test]
async fn session_bound_put_requires_live_session() {
    let store = MemoryStore::new();
    let dead = SessionId::new("never-created");
    let bound = store.put_with_session("k", b"v", &dead).await.unwrap();
    assert!(!bound);

    let session = store.create_session("svc").await.unwrap();
    let bound = store.put_with_session("k", b"v", &session).await.unwrap();
    assert!(bound);
}

#[tokio::test]
async fn expiring_session_removes_bound_keys() {
    let store = MemoryStore::new();
    let session = store.create_session("svc").await.unwrap();
    store
        .put_with_session("svc/a", b"v", &session)
        .await
        .unwrap();
    store.put_cas("svc/free", b"v", 0).await.unwrap();

    store.expire_session(&session);

    let entries = store.get_prefix("svc/").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "svc/free");
}

#[tokio::test]
async fn cas_zero_means_key_must_not_exist() {
    let store = MemoryStore::new();
    assert!(store.put_cas("k", b"one", 0).await.unwrap());
    // Key now exists at a nonzero version, so cas=0 loses
    assert!(!store.put_cas("k", b"two", 0).await.unwrap());
}

#[tokio::test]
async fn cas_succeeds_only_at_observed_version() {
    let store = MemoryStore::new();
    store.put_cas("k", b"one", 0).await.unwrap();
    let entries = store.get_prefix("k").await.unwrap();
    let version = entries[0].modify_version;

    assert!(!store.put_cas("k", b"stale", version + 1).await.unwrap());
    assert!(store.put_cas("k", b"two", version).await.unwrap());
}

#[tokio::test]
async fn racing_cas_writes_have_one_winner() {
    let store = MemoryStore::new();
    store.put_cas("k", b"base", 0).await.unwrap();
    let version = store.get_prefix("k").await.unwrap()[0].modify_version;

    let first = store.put_cas("k", b"x", version).await.unwrap();
    let second = store.put_cas("k", b"y", version).await.unwrap();
    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn forced_conflicts_consume_then_clear() {
    let store = MemoryStore::new();
    store.fail_next_cas(1);
    assert!(!store.put_cas("k", b"v", 0).await.unwrap());
    assert!(store.put_cas("k", b"v", 0).await.unwrap());
}

#[tokio::test]
async fn outage_surfaces_as_store_error() {
    let store = MemoryStore::new();
    store.set_unavailable(true);
    assert!(matches!(
        store.get_prefix("k").await,
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn delete_removes_key() {
    let store = MemoryStore::new();
    store.put_cas("k", b"v", 0).await.unwrap();
    store.delete("k").await.unwrap();
    assert!(store.get_prefix("k").await.unwrap().is_empty());
}
