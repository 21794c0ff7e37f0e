// SPDX-License-Identifier: MIT

//! sluice-consul: Consul adapter for the sluice semaphore
//!
//! Implements the `KvStore` and `SessionProvider` traits from `sluice-core`
//! against a Consul agent's HTTP API. Session liveness (TTL renewal,
//! invalidation on node failure) is Consul's job; this crate only creates
//! sessions and binds keys to them.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod api;
mod store;

pub use store::ConsulStore;
