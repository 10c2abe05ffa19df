//! Shared fixtures for this crate's tests.

use crate::publisher::OutboundTransport;
use async_trait::async_trait;
use capture_core::{CanonicalTrade, TradeType};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

pub(crate) fn sample_trade(account: &str) -> CanonicalTrade {
    CanonicalTrade {
        trade_id: Uuid::new_v4(),
        account_number: account.to_string(),
        security_id: "SEC1".to_string(),
        trade_type: TradeType::Buy,
        amount: 100.0,
        timestamp: Utc::now(),
    }
}

/// Transport that fails the first `failures` sends and succeeds after.
pub(crate) struct FlakyTransport {
    attempts: AtomicUsize,
    failures: usize,
}

impl FlakyTransport {
    pub(crate) fn new(failures: usize) -> Self {
        Self {
            attempts: AtomicUsize::new(0),
            failures,
        }
    }
}

#[async_trait]
impl OutboundTransport for FlakyTransport {
    async fn send(&self, _key: &str, _payload: &[u8]) -> anyhow::Result<()> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
            anyhow::bail!("transient failure")
        }
        Ok(())
    }
}
