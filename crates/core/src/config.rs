//! Configuration structures for the instruction-capture pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the capture service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform / channel configuration.
    pub platform: PlatformConfig,
    /// Pending store configuration.
    pub store: StoreConfig,
    /// Publisher configuration.
    pub publisher: PublisherConfig,
    /// Bulk ingestion configuration.
    pub ingest: IngestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: PlatformConfig::default(),
            store: StoreConfig::default(),
            publisher: PublisherConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

/// Identity of the owning venue and the channels it speaks on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Constant platform identifier stamped on every outbound envelope.
    pub platform_id: String,
    /// Outbound channel name.
    pub outbound_topic: String,
    /// Inbound channel name.
    pub inbound_topic: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            platform_id: "ACCT123".to_string(),
            outbound_topic: "instructions.outbound".to_string(),
            inbound_topic: "instructions.inbound".to_string(),
        }
    }
}

/// What to do when the pending store is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Refuse the insert and surface `StoreFull` to the caller.
    RejectNew,
    /// Drop the entry that has been pending longest, then insert.
    EvictOldest,
}

/// Pending store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of pending entries.
    pub capacity: usize,
    /// Behavior at capacity.
    pub overflow: OverflowPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            overflow: OverflowPolicy::RejectNew,
        }
    }
}

/// Publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Deadline for a single publish attempt (ms). An unresolved completion
    /// past this deadline is treated as a failure.
    pub publish_timeout_ms: u64,
    /// Maximum simultaneous in-flight publishes.
    pub max_in_flight: usize,
    /// Interval between retry sweeps over the pending store (seconds).
    pub sweep_interval_secs: u64,
    /// Minimum age before a pending entry is re-published (seconds).
    pub retry_age_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: 5_000,
            max_in_flight: 32,
            sweep_interval_secs: 30,
            retry_age_secs: 60,
        }
    }
}

/// Bulk ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Records handed to the pipeline per batch during a bulk upload.
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { batch_size: 256 }
    }
}
