//! Outbound publishing.
//!
//! Maps canonical trades onto the redacted platform envelope, serializes,
//! and sends asynchronously with the trade id as the partition key. The
//! completion effect is applied here, in one place: success removes the
//! trade from the pending store, failure or timeout leaves it for the retry
//! sweeper. Log lines carry the trade id only, never the record body.
//!
//! Note the ordering caveat: the key is a generated trade id, so trades for
//! the same account or security have no relative ordering downstream.

use crate::store::PendingStore;
use async_trait::async_trait;
use capture_core::config::PublisherConfig;
use capture_core::{CanonicalTrade, Error, OutboundEnvelope, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Seam to the message-bus client, which lives outside this system.
/// Implementations send one message and report transport-level success or
/// failure; everything above the wire (envelope, masking, store
/// reconciliation) is this crate's job.
#[async_trait]
pub trait OutboundTransport: Send + Sync {
    async fn send(&self, key: &str, payload: &[u8]) -> anyhow::Result<()>;
}

/// One message handed to the transport.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub key: String,
    pub payload: Vec<u8>,
}

/// In-process transport over a tokio channel. Stands in for the real bus
/// client in tests and demos; the receiver side plays the downstream
/// platform.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<OutboundMessage>,
}

impl ChannelTransport {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl OutboundTransport for ChannelTransport {
    async fn send(&self, key: &str, payload: &[u8]) -> anyhow::Result<()> {
        self.sender
            .send(OutboundMessage {
                key: key.to_string(),
                payload: payload.to_vec(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("outbound channel closed"))
    }
}

/// Publishes canonical trades and reconciles the pending store on
/// completion.
#[derive(Clone)]
pub struct Publisher {
    transport: Arc<dyn OutboundTransport>,
    store: Arc<PendingStore>,
    platform_id: String,
    send_timeout: Duration,
    in_flight: Arc<Semaphore>,
}

impl Publisher {
    pub fn new(
        transport: Arc<dyn OutboundTransport>,
        store: Arc<PendingStore>,
        platform_id: impl Into<String>,
        config: &PublisherConfig,
    ) -> Self {
        Self {
            transport,
            store,
            platform_id: platform_id.into(),
            send_timeout: Duration::from_millis(config.publish_timeout_ms),
            in_flight: Arc::new(Semaphore::new(config.max_in_flight)),
        }
    }

    pub fn store(&self) -> &Arc<PendingStore> {
        &self.store
    }

    /// Fire off a publish without waiting for completion. The returned
    /// handle resolves once the completion effect has been applied to the
    /// pending store.
    pub fn publish(&self, trade: CanonicalTrade) -> JoinHandle<Result<Uuid>> {
        let this = self.clone();
        tokio::spawn(async move { this.publish_and_wait(trade).await })
    }

    /// Publish one trade and wait for its completion signal.
    ///
    /// Success removes exactly this trade id from the pending store. A
    /// transport failure, a deadline overrun, or a closed transport leaves
    /// the entry pending for the retry sweeper.
    pub async fn publish_and_wait(&self, trade: CanonicalTrade) -> Result<Uuid> {
        let trade_id = trade.trade_id;
        let envelope = OutboundEnvelope::from_trade(&trade, &self.platform_id);
        let payload = serde_json::to_vec(&envelope)?;
        let key = trade_id.to_string();

        let _permit = self
            .in_flight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::publish(trade_id))?;

        match tokio::time::timeout(self.send_timeout, self.transport.send(&key, &payload)).await {
            Ok(Ok(())) => {
                self.store.remove(&trade_id);
                debug!(trade_id = %trade_id, "published");
                Ok(trade_id)
            }
            Ok(Err(_)) => {
                warn!(trade_id = %trade_id, "publish failed, trade retained for retry");
                Err(Error::publish(trade_id))
            }
            Err(_) => {
                warn!(trade_id = %trade_id, "publish timed out, trade retained for retry");
                Err(Error::publish_timeout(trade_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_trade, FlakyTransport};
    use capture_core::config::StoreConfig;
    use capture_core::OverflowPolicy;

    /// Transport that fails every send.
    struct FailingTransport;

    #[async_trait]
    impl OutboundTransport for FailingTransport {
        async fn send(&self, _key: &str, _payload: &[u8]) -> anyhow::Result<()> {
            anyhow::bail!("broker unavailable")
        }
    }

    /// Transport whose send never resolves.
    struct StalledTransport;

    #[async_trait]
    impl OutboundTransport for StalledTransport {
        async fn send(&self, _key: &str, _payload: &[u8]) -> anyhow::Result<()> {
            std::future::pending().await
        }
    }

    fn new_store() -> Arc<PendingStore> {
        Arc::new(PendingStore::new(&StoreConfig {
            capacity: 1024,
            overflow: OverflowPolicy::RejectNew,
        }))
    }

    fn publisher_with(
        transport: Arc<dyn OutboundTransport>,
        store: Arc<PendingStore>,
        timeout_ms: u64,
    ) -> Publisher {
        Publisher::new(
            transport,
            store,
            "ACCT123",
            &PublisherConfig {
                publish_timeout_ms: timeout_ms,
                ..PublisherConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_success_removes_only_that_trade() {
        let store = new_store();
        let (transport, mut rx) = ChannelTransport::new(16);
        let publisher = publisher_with(Arc::new(transport), store.clone(), 1000);

        let published = sample_trade("4111111111111111");
        let other = sample_trade("4111111111111111");
        let other_id = other.trade_id;
        store.insert(published.clone()).unwrap();
        store.insert(other).unwrap();

        let id = publisher.publish_and_wait(published).await.unwrap();

        assert!(!store.contains(&id));
        assert!(store.contains(&other_id));

        let message = rx.recv().await.unwrap();
        assert_eq!(message.key, id.to_string());
    }

    #[tokio::test]
    async fn test_envelope_is_masked_on_the_wire() {
        let store = new_store();
        let (transport, mut rx) = ChannelTransport::new(16);
        let publisher = publisher_with(Arc::new(transport), store.clone(), 1000);

        let trade = sample_trade("4111111111111111");
        store.insert(trade.clone()).unwrap();
        publisher.publish_and_wait(trade).await.unwrap();

        let message = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(json["platform_id"], "ACCT123");
        assert_eq!(json["trade"]["account"], "****1111");
        let wire = String::from_utf8(message.payload).unwrap();
        assert!(!wire.contains("4111111111111111"));
    }

    #[tokio::test]
    async fn test_failure_retains_trade() {
        let store = new_store();
        let publisher = publisher_with(Arc::new(FailingTransport), store.clone(), 1000);

        let trade = sample_trade("4111111111111111");
        let id = trade.trade_id;
        store.insert(trade.clone()).unwrap();

        let err = publisher.publish_and_wait(trade).await.unwrap_err();
        assert!(matches!(err, Error::Publish { trade_id } if trade_id == id));
        assert!(store.contains(&id));
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let store = new_store();
        let publisher = publisher_with(Arc::new(StalledTransport), store.clone(), 20);

        let trade = sample_trade("4111111111111111");
        let id = trade.trade_id;
        store.insert(trade.clone()).unwrap();

        let err = publisher.publish_and_wait(trade).await.unwrap_err();
        assert!(matches!(err, Error::PublishTimeout { trade_id } if trade_id == id));
        assert!(store.contains(&id));
    }

    #[tokio::test]
    async fn test_flaky_transport_succeeds_on_retry() {
        let store = new_store();
        let publisher = publisher_with(Arc::new(FlakyTransport::new(1)), store.clone(), 1000);

        let trade = sample_trade("4111111111111111");
        let id = trade.trade_id;
        store.insert(trade.clone()).unwrap();

        assert!(publisher.publish_and_wait(trade.clone()).await.is_err());
        assert!(store.contains(&id));

        publisher.publish_and_wait(trade).await.unwrap();
        assert!(!store.contains(&id));
    }
}
