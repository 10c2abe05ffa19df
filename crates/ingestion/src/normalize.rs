//! Field validation and canonical-form conversion.
//!
//! Pure functions, no I/O. A record that fails any step here is skipped by
//! the caller; it is never stored and never published.

use capture_core::{CanonicalTrade, Error, RawTrade, Result, TradeType};
use chrono::Utc;
use uuid::Uuid;

/// Maximum length of a normalized security id.
const SECURITY_ID_MAX_LEN: usize = 12;

/// Trim, uppercase, and validate a security id against `^[A-Z0-9-]{1,12}$`.
pub fn normalize_security(sec: &str) -> Result<String> {
    let up = sec.trim().to_uppercase();
    let valid = !up.is_empty()
        && up.len() <= SECURITY_ID_MAX_LEN
        && up
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-');
    if !valid {
        return Err(Error::validation("invalid security id"));
    }
    Ok(up)
}

/// Map a case-insensitive trade-type synonym onto its canonical code.
///
/// Accepts `buy`/`b` and `sell`/`s` in any casing; anything else fails.
pub fn normalize_trade_type(raw: &str) -> Result<TradeType> {
    match raw.trim().to_lowercase().as_str() {
        "buy" | "b" => Ok(TradeType::Buy),
        "sell" | "s" => Ok(TradeType::Sell),
        _ => Err(Error::validation("unsupported trade type")),
    }
}

/// Convert a raw record into a [`CanonicalTrade`].
///
/// Assigns a fresh v4 uuid on every call, so two structurally identical
/// inputs yield distinct trades. The raw account number is copied unchanged;
/// it stays internal and masked views are derived from it later. A missing
/// amount defaults to 0 and a missing timestamp to the ingestion instant,
/// matching the inbound channel contract. The first validation failure
/// propagates and the record is dropped by the caller.
pub fn canonicalize(raw: &RawTrade) -> Result<CanonicalTrade> {
    Ok(CanonicalTrade {
        trade_id: Uuid::new_v4(),
        account_number: raw.account_number.clone(),
        security_id: normalize_security(&raw.security_id)?,
        trade_type: normalize_trade_type(&raw.trade_type)?,
        amount: raw.amount.unwrap_or(0.0),
        timestamp: raw.timestamp.unwrap_or_else(Utc::now),
    })
}
