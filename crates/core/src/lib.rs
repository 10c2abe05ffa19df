//! Core types and configuration for the instruction-capture pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Trade record types (raw, canonical, outbound envelope, audit row)
//! - Account masking
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod mask;
pub mod types;

pub use config::{Config, OverflowPolicy};
pub use error::{Error, Result};
pub use mask::{mask_account, mask_account_opt};
pub use types::*;
