//! Capture pipeline for the instruction-capture system.
//!
//! This crate handles:
//! - The pending-confirmation store (bounded, thread-safe)
//! - Outbound publishing with masked envelopes and timeout accounting
//! - Periodic retry of failed publishes
//! - The inbound event-stream entry point
//! - The service facade tying upload and feed ingestion together

pub mod feed;
pub mod publisher;
pub mod retry;
pub mod service;
pub mod store;

#[cfg(test)]
mod testutil;

pub use feed::InboundFeed;
pub use publisher::{ChannelTransport, OutboundMessage, OutboundTransport, Publisher};
pub use retry::spawn_retry_sweeper;
pub use service::{CaptureService, UploadReport};
pub use store::PendingStore;
