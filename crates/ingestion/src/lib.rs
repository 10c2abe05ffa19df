//! Upload decoding and normalization for the instruction-capture pipeline.
//!
//! This crate handles:
//! - Bulk-file parsing (delimited text and structured documents)
//! - Field validation and canonical-form conversion
//! - Trade id assignment

pub mod normalize;
pub mod parser;

pub use normalize::{canonicalize, normalize_security, normalize_trade_type};
pub use parser::{parse, FileFormat};
