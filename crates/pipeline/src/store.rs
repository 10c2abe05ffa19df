//! Pending-confirmation store.
//!
//! Keyed container of canonical trades awaiting a successful publish. Safe
//! under arbitrary concurrent invocation: ingestion paths insert from their
//! own threads while publish completions remove from the runtime's workers,
//! with no locking expected of callers.

use capture_core::config::StoreConfig;
use capture_core::{AuditEntry, CanonicalTrade, Error, OverflowPolicy, Result};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PendingEntry {
    trade: CanonicalTrade,
    inserted_at: Instant,
}

/// Thread-safe container of trades pending publish confirmation, keyed by
/// trade id, with a bounded capacity and a configurable overflow policy.
#[derive(Debug)]
pub struct PendingStore {
    entries: DashMap<Uuid, PendingEntry>,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl PendingStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: config.capacity,
            overflow: config.overflow,
        }
    }

    /// Upsert a trade. Re-inserting an id already present never counts
    /// against capacity. At capacity the configured overflow policy decides:
    /// reject the insert, or evict the entry pending longest.
    ///
    /// The capacity check races with concurrent inserts at the margin, so a
    /// burst can overshoot by at most the number of racing callers.
    pub fn insert(&self, trade: CanonicalTrade) -> Result<()> {
        if !self.entries.contains_key(&trade.trade_id) && self.entries.len() >= self.capacity {
            match self.overflow {
                OverflowPolicy::RejectNew => {
                    return Err(Error::StoreFull {
                        capacity: self.capacity,
                    })
                }
                OverflowPolicy::EvictOldest => self.evict_oldest(),
            }
        }
        self.entries.insert(
            trade.trade_id,
            PendingEntry {
                trade,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Option<CanonicalTrade> {
        self.entries.get(id).map(|entry| entry.trade.clone())
    }

    /// Remove a trade, returning it if it was present.
    pub fn remove(&self, id: &Uuid) -> Option<CanonicalTrade> {
        self.entries.remove(id).map(|(_, entry)| entry.trade)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Masked snapshot of every pending entry, for the audit surface.
    /// Consistency under concurrent mutation is best-effort, which is all
    /// the read-only listing needs.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .map(|entry| AuditEntry::from_trade(&entry.trade))
            .collect()
    }

    /// Snapshot of trades that have been pending at least `age`, for the
    /// retry sweeper.
    pub fn pending_older_than(&self, age: Duration) -> Vec<CanonicalTrade> {
        self.entries
            .iter()
            .filter(|entry| entry.inserted_at.elapsed() >= age)
            .map(|entry| entry.trade.clone())
            .collect()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| *entry.key());
        if let Some(id) = oldest {
            self.entries.remove(&id);
            tracing::warn!(trade_id = %id, "evicted oldest pending trade at capacity");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_core::TradeType;
    use chrono::Utc;

    fn store_with(capacity: usize, overflow: OverflowPolicy) -> PendingStore {
        PendingStore::new(&StoreConfig { capacity, overflow })
    }

    fn sample_trade(account: &str) -> CanonicalTrade {
        CanonicalTrade {
            trade_id: Uuid::new_v4(),
            account_number: account.to_string(),
            security_id: "SEC1".to_string(),
            trade_type: TradeType::Buy,
            amount: 100.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let store = store_with(8, OverflowPolicy::RejectNew);
        let trade = sample_trade("AC1");
        let id = trade.trade_id;

        store.insert(trade).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().account_number, "AC1");

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.trade_id, id);
        assert!(store.is_empty());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn test_upsert_same_id_does_not_duplicate() {
        let store = store_with(8, OverflowPolicy::RejectNew);
        let mut trade = sample_trade("AC1");
        let id = trade.trade_id;
        store.insert(trade.clone()).unwrap();

        trade.amount = 250.0;
        store.insert(trade).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().amount, 250.0);
    }

    #[test]
    fn test_reject_new_at_capacity() {
        let store = store_with(2, OverflowPolicy::RejectNew);
        store.insert(sample_trade("AC1")).unwrap();
        store.insert(sample_trade("AC2")).unwrap();

        let err = store.insert(sample_trade("AC3")).unwrap_err();
        assert!(matches!(err, Error::StoreFull { capacity: 2 }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_at_capacity_still_allowed() {
        let store = store_with(1, OverflowPolicy::RejectNew);
        let trade = sample_trade("AC1");
        store.insert(trade.clone()).unwrap();
        // same id again: upsert, not a rejected new insert
        store.insert(trade).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evict_oldest_at_capacity() {
        let store = store_with(2, OverflowPolicy::EvictOldest);
        let first = sample_trade("AC1");
        let first_id = first.trade_id;
        store.insert(first).unwrap();
        store.insert(sample_trade("AC2")).unwrap();

        let third = sample_trade("AC3");
        let third_id = third.trade_id;
        store.insert(third).unwrap();

        assert_eq!(store.len(), 2);
        assert!(!store.contains(&first_id));
        assert!(store.contains(&third_id));
    }

    #[test]
    fn test_audit_entries_are_masked() {
        let store = store_with(8, OverflowPolicy::RejectNew);
        store.insert(sample_trade("4111111111111111")).unwrap();

        let entries = store.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account, "****1111");
    }

    #[test]
    fn test_pending_older_than() {
        let store = store_with(8, OverflowPolicy::RejectNew);
        store.insert(sample_trade("AC1")).unwrap();

        assert_eq!(store.pending_older_than(Duration::ZERO).len(), 1);
        assert!(store
            .pending_older_than(Duration::from_secs(3600))
            .is_empty());
    }

    #[test]
    fn test_concurrent_inserts_no_loss() {
        let store = std::sync::Arc::new(store_with(10_000, OverflowPolicy::RejectNew));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    store.insert(sample_trade("AC1")).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
