//! Inbound event-stream entry point.
//!
//! The message-bus consumer is an external collaborator; it delivers one raw
//! JSON record per invocation and this type drives it through the same
//! normalize → store → publish path as a bulk upload. Every failure comes
//! back as a typed error so the consumer can account for the drop; log lines
//! never include payload content.

use crate::publisher::Publisher;
use crate::store::PendingStore;
use capture_core::{Error, RawTrade, Result};
use capture_ingestion::canonicalize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Handles records arriving one at a time from the inbound channel.
#[derive(Clone)]
pub struct InboundFeed {
    store: Arc<PendingStore>,
    publisher: Publisher,
}

impl InboundFeed {
    pub fn new(store: Arc<PendingStore>, publisher: Publisher) -> Self {
        Self { store, publisher }
    }

    /// Process one raw record. Field contract: a JSON object with
    /// `accountNumber`, `securityId`, `tradeType`, `amount`, and an optional
    /// `timestamp`.
    ///
    /// On success the trade is pending and its publish is in flight; the
    /// returned id identifies it. A decode or validation failure drops the
    /// record and reports why; a full store surfaces `StoreFull` so the
    /// consumer can apply backpressure instead of losing the record.
    pub async fn handle_message(&self, payload: &[u8]) -> Result<Uuid> {
        let raw: RawTrade = serde_json::from_slice(payload).map_err(|_| {
            warn!("dropping inbound record: malformed payload");
            Error::parse("malformed inbound record")
        })?;

        let trade = canonicalize(&raw).map_err(|err| {
            warn!(error = %err, "dropping inbound record");
            err
        })?;
        let trade_id = trade.trade_id;

        self.store.insert(trade.clone())?;
        self.publisher.publish(trade);
        Ok(trade_id)
    }
}
