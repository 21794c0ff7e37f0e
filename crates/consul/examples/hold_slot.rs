// SPDX-License-Identifier: MIT

//! Acquire a semaphore slot against a local Consul agent, hold it for a
//! few seconds, then release it.
//!
//! Run with a Consul agent on 127.0.0.1:8500:
//!     cargo run --example hold_slot

use sluice_consul::ConsulStore;
use sluice_core::{Semaphore, SemaphoreConfig, SessionProvider};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = ConsulStore::new("http://127.0.0.1:8500");
    let config = SemaphoreConfig::new("myreleaseservice", 3)
        .with_retry_interval(Duration::from_secs(1));
    let wait = config.wait_policy();
    let semaphore = Semaphore::start(&store, store.clone(), config).await?;

    let guard = semaphore.acquire(&wait).await?;

    for i in (0..=10).rev() {
        info!("releasing slot in {} seconds", i);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let session = semaphore.session().clone();
    semaphore.release(guard).await?;
    store.destroy_session(&session).await?;

    Ok(())
}
