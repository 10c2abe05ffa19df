//! Periodic retry of failed publishes.
//!
//! The pending store retains every trade whose publish failed or timed out.
//! This sweeper walks the store on a fixed interval and re-publishes entries
//! that have been pending longer than the configured age. Entries published
//! successfully in the meantime are gone from the store and never resent.

use crate::publisher::Publisher;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawn the background sweep task. It runs until the returned handle is
/// aborted (or the runtime shuts down).
pub fn spawn_retry_sweeper(
    publisher: Publisher,
    sweep_interval: Duration,
    retry_age: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick fires immediately; skip it so a fresh entry is not
        // resent before its first attempt resolves
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stale = publisher.store().pending_older_than(retry_age);
            if stale.is_empty() {
                continue;
            }
            info!(count = stale.len(), "re-publishing aged pending trades");
            for trade in stale {
                // failures are logged by the publisher and the entry stays
                // pending for the next sweep
                let _ = publisher.publish_and_wait(trade).await;
            }
        }
    })
}
