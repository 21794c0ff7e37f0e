// SPDX-License-Identifier: MIT

//! Consul-backed store and session provider
//!
//! Thin adapter over the Consul HTTP API: session-bound puts via
//! `?acquire`, optimistic puts via `?cas`, recursive reads via `?recurse`.
//! The blocking HTTP client runs under `spawn_blocking`.

use crate::api::{entries_from_pairs, parse_condition, KvPair, SessionCreated, SessionRequest};
use async_trait::async_trait;
use sluice_core::store::{KvEntry, KvStore, SessionId, SessionProvider, StoreError};
use tracing::debug;

/// Client for a Consul agent's KV and session endpoints
#[derive(Clone)]
pub struct ConsulStore {
    base_url: String,
    agent: ureq::Agent,
}

impl ConsulStore {
    /// `base_url` is the agent address, e.g. `http://127.0.0.1:8500`
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    pub(crate) fn kv_url(&self, key: &str) -> String {
        format!("{}/v1/kv/{}", self.base_url, key)
    }

    pub(crate) fn session_url(&self, op: &str) -> String {
        format!("{}/v1/session/{}", self.base_url, op)
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(ConsulStore) -> Result<T, StoreError> + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || op(client))
            .await
            .map_err(|e| StoreError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

fn transport(e: ureq::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn conditional_put(client: &ConsulStore, url: &str, value: &[u8]) -> Result<bool, StoreError> {
    let mut response = client.agent.put(url).send(value).map_err(transport)?;
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(transport)?;
    parse_condition(&body)
}

#[async_trait]
impl KvStore for ConsulStore {
    async fn put_with_session(
        &self,
        key: &str,
        value: &[u8],
        session: &SessionId,
    ) -> Result<bool, StoreError> {
        let url = format!("{}?acquire={}", self.kv_url(key), session);
        let value = value.to_vec();
        self.run_blocking(move |client| conditional_put(&client, &url, &value))
            .await
    }

    async fn get_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError> {
        let url = format!("{}?recurse=true", self.kv_url(prefix));
        self.run_blocking(move |client| {
            let pairs = match client.agent.get(&url).call() {
                Ok(mut response) => response
                    .body_mut()
                    .read_json::<Vec<KvPair>>()
                    .map_err(transport)?,
                // Absent prefix is the valid empty snapshot
                Err(ureq::Error::StatusCode(404)) => Vec::new(),
                Err(e) => return Err(transport(e)),
            };
            debug!(count = pairs.len(), "recursive kv read");
            entries_from_pairs(pairs)
        })
        .await
    }

    async fn put_cas(
        &self,
        key: &str,
        value: &[u8],
        expected_version: u64,
    ) -> Result<bool, StoreError> {
        let url = format!("{}?cas={}", self.kv_url(key), expected_version);
        let value = value.to_vec();
        self.run_blocking(move |client| conditional_put(&client, &url, &value))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let url = self.kv_url(key);
        self.run_blocking(move |client| {
            client.agent.delete(&url).call().map_err(transport)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SessionProvider for ConsulStore {
    async fn create_session(&self, service: &str) -> Result<SessionId, StoreError> {
        let url = self.session_url("create");
        let body = serde_json::to_vec(&SessionRequest { name: service })
            .map_err(|e| StoreError::UnexpectedResponse(e.to_string()))?;
        self.run_blocking(move |client| {
            let mut response = client.agent.put(&url).send(&body[..]).map_err(transport)?;
            let created = response
                .body_mut()
                .read_json::<SessionCreated>()
                .map_err(transport)?;
            debug!(session = %created.id, "consul session created");
            Ok(SessionId::new(created.id))
        })
        .await
    }

    async fn destroy_session(&self, session: &SessionId) -> Result<(), StoreError> {
        let url = self.session_url(&format!("destroy/{}", session));
        self.run_blocking(move |client| {
            client.agent.put(&url).send(&b""[..]).map_err(transport)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
