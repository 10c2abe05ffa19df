//! Core data types for the instruction-capture pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::mask::mask_account;

/// Direction of a trade instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    /// Buy instruction, wire code `"B"`.
    #[serde(rename = "B")]
    Buy,
    /// Sell instruction, wire code `"S"`.
    #[serde(rename = "S")]
    Sell,
}

impl TradeType {
    /// Single-letter wire code.
    #[inline]
    pub fn code(self) -> &'static str {
        match self {
            TradeType::Buy => "B",
            TradeType::Sell => "S",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A trade instruction as received, before normalization.
///
/// Field names follow the inbound channel contract and the structured-document
/// upload shape: `accountNumber`, `securityId`, `tradeType`, `amount`,
/// `timestamp`. `amount` and `timestamp` are optional on the wire; the
/// normalizer supplies defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    pub account_number: String,
    pub security_id: String,
    pub trade_type: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The canonical, normalized record of one trade instruction.
///
/// `account_number` is sensitive: it is kept raw internally (retry paths need
/// the real value) but must never reach a log line or an outward view
/// unmasked. The manual `Debug` impl below enforces that for formatting.
#[derive(Clone, Serialize, Deserialize)]
pub struct CanonicalTrade {
    /// Primary key, generated once at normalization time.
    pub trade_id: Uuid,
    /// Raw account identifier. Sensitive, internal only.
    pub account_number: String,
    /// Uppercase security id matching `^[A-Z0-9-]{1,12}$`.
    pub security_id: String,
    pub trade_type: TradeType,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Debug for CanonicalTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalTrade")
            .field("trade_id", &self.trade_id)
            .field("account_number", &mask_account(&self.account_number))
            .field("security_id", &self.security_id)
            .field("trade_type", &self.trade_type)
            .field("amount", &self.amount)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Redacted trade body inside the outbound envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeTrade {
    /// Masked account identifier.
    pub account: String,
    pub security: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// The platform-facing representation sent downstream.
///
/// Wire form: `{"platform_id": ..., "trade": {"account": "****...", ...}}`.
/// The mapping from [`CanonicalTrade`] is lossy: the raw account is discarded
/// and not recoverable from the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub platform_id: String,
    pub trade: EnvelopeTrade,
}

impl OutboundEnvelope {
    /// Build the redacted envelope for a canonical trade.
    pub fn from_trade(trade: &CanonicalTrade, platform_id: &str) -> Self {
        Self {
            platform_id: platform_id.to_string(),
            trade: EnvelopeTrade {
                account: mask_account(&trade.account_number),
                security: trade.security_id.clone(),
                trade_type: trade.trade_type,
                amount: trade.amount,
                timestamp: trade.timestamp,
            },
        }
    }
}

/// One row of the audit listing: everything a reader may see about a pending
/// trade. Never carries the raw account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    /// Masked account identifier.
    pub account: String,
    pub security: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Build the masked audit row for a canonical trade.
    pub fn from_trade(trade: &CanonicalTrade) -> Self {
        Self {
            id: trade.trade_id,
            account: mask_account(&trade.account_number),
            security: trade.security_id.clone(),
            trade_type: trade.trade_type,
            amount: trade.amount,
            timestamp: trade.timestamp,
        }
    }
}
