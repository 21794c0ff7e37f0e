// SPDX-License-Identifier: MIT

//! Consul HTTP API payloads
//!
//! Pure decoding of the agent's JSON responses; no I/O here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sluice_core::store::{KvEntry, StoreError};

/// One entry of a `GET /v1/kv/<prefix>?recurse` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct KvPair {
    pub key: String,
    /// Base64-encoded; null for zero-length values
    #[serde(default)]
    pub value: Option<String>,
    pub modify_index: u64,
}

/// Body for `PUT /v1/session/create`
#[derive(Debug, Serialize)]
pub(crate) struct SessionRequest<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
}

/// Response of `PUT /v1/session/create`
#[derive(Debug, Deserialize)]
pub(crate) struct SessionCreated {
    #[serde(rename = "ID")]
    pub id: String,
}

/// Decode a recursive KV read into store entries
pub(crate) fn entries_from_pairs(pairs: Vec<KvPair>) -> Result<Vec<KvEntry>, StoreError> {
    pairs
        .into_iter()
        .map(|pair| {
            let value = match pair.value {
                Some(encoded) => BASE64.decode(encoded.as_bytes()).map_err(|e| {
                    StoreError::UnexpectedResponse(format!(
                        "bad base64 value for key {}: {}",
                        pair.key, e
                    ))
                })?,
                None => Vec::new(),
            };
            Ok(KvEntry {
                key: pair.key,
                value,
                modify_version: pair.modify_index,
            })
        })
        .collect()
}

/// Conditional KV puts answer a literal `true` or `false` body
pub(crate) fn parse_condition(body: &str) -> Result<bool, StoreError> {
    match body.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(StoreError::UnexpectedResponse(format!(
            "expected true/false, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
