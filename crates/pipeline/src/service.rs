//! The capture service: ingestion → normalization → publish, end to end.
//!
//! Owns the pending store and publisher and injects them into both entry
//! points (bulk upload and inbound feed), so there is no process-wide state
//! and an alternative store can be swapped in without touching pipeline
//! logic.

use crate::feed::InboundFeed;
use crate::publisher::{OutboundTransport, Publisher};
use crate::retry::spawn_retry_sweeper;
use crate::store::PendingStore;
use capture_core::{AuditEntry, Config, Error, Result};
use capture_ingestion::{canonicalize, parse, FileFormat};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of one bulk upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Records normalized, stored, and handed to the publisher.
    pub ingested: usize,
    /// Trade ids generated for them, in input order.
    pub ids: Vec<Uuid>,
    /// Records rejected by parsing or validation.
    pub rejected: usize,
}

/// Facade wiring the pipeline together.
pub struct CaptureService {
    config: Config,
    store: Arc<PendingStore>,
    publisher: Publisher,
    feed: InboundFeed,
}

impl CaptureService {
    pub fn new(config: Config, transport: Arc<dyn OutboundTransport>) -> Self {
        let store = Arc::new(PendingStore::new(&config.store));
        let publisher = Publisher::new(
            transport,
            store.clone(),
            config.platform.platform_id.clone(),
            &config.publisher,
        );
        let feed = InboundFeed::new(store.clone(), publisher.clone());
        Self {
            config,
            store,
            publisher,
            feed,
        }
    }

    /// Ingest one uploaded file.
    ///
    /// Structural problems (missing name, empty file, unsupported format or
    /// shape) fail the whole call before any record is processed. Individual
    /// records that fail parsing or validation are counted as rejected and
    /// the rest of the batch continues. Publishing is fired per batch with
    /// the batch joined before the next begins, so an arbitrarily large file
    /// cannot enqueue unbounded in-flight publishes. A full pending store
    /// aborts the upload with `StoreFull`.
    pub async fn ingest_file(&self, filename: &str, bytes: &[u8]) -> Result<UploadReport> {
        let format = FileFormat::from_filename(filename)?;
        let outcomes = parse(format, bytes)?;

        let mut report = UploadReport {
            ingested: 0,
            ids: Vec::new(),
            rejected: 0,
        };
        let mut in_flight: Vec<JoinHandle<Result<Uuid>>> = Vec::new();

        for outcome in outcomes {
            let raw = match outcome {
                Ok(raw) => raw,
                Err(err) => {
                    debug!(error = %err, "record rejected");
                    report.rejected += 1;
                    continue;
                }
            };
            let trade = match canonicalize(&raw) {
                Ok(trade) => trade,
                Err(err) => {
                    debug!(error = %err, "record rejected");
                    report.rejected += 1;
                    continue;
                }
            };

            let trade_id = trade.trade_id;
            match self.store.insert(trade.clone()) {
                Ok(()) => {}
                Err(err @ Error::StoreFull { .. }) => {
                    // surface, never swallow: the caller learns how far the
                    // upload got through the error, trades already ingested
                    // stay pending
                    drain(&mut in_flight).await;
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
            in_flight.push(self.publisher.publish(trade));
            report.ids.push(trade_id);
            report.ingested += 1;

            if in_flight.len() >= self.config.ingest.batch_size {
                drain(&mut in_flight).await;
            }
        }
        drain(&mut in_flight).await;

        info!(
            ingested = report.ingested,
            rejected = report.rejected,
            "upload processed"
        );
        Ok(report)
    }

    /// Masked listing of every trade currently pending.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.store.audit_entries()
    }

    /// Entry point for the inbound channel consumer.
    pub fn feed(&self) -> &InboundFeed {
        &self.feed
    }

    pub fn store(&self) -> &Arc<PendingStore> {
        &self.store
    }

    /// Start the periodic re-publish of aged pending trades.
    pub fn start_retry_sweeper(&self) -> JoinHandle<()> {
        spawn_retry_sweeper(
            self.publisher.clone(),
            Duration::from_secs(self.config.publisher.sweep_interval_secs),
            Duration::from_secs(self.config.publisher.retry_age_secs),
        )
    }
}

/// Await a batch of publish completions. Failures are already logged and the
/// trades retained, so the handles' results are not inspected here.
async fn drain(handles: &mut Vec<JoinHandle<Result<Uuid>>>) {
    for handle in handles.drain(..) {
        let _ = handle.await;
    }
}
