//! In-memory delta store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{DeltaStoreError, DeltaStorePort};
use crate::domain::delta::DeltaRecord;

/// In-memory implementation of `DeltaStorePort`.
///
/// Holds the latest delta per symbol. Suitable for local runs and testing.
#[derive(Debug, Default)]
pub struct InMemoryDeltaStore {
    deltas: RwLock<HashMap<String, f64>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryDeltaStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest delta stored for a symbol.
    #[must_use]
    pub fn delta(&self, symbol: &str) -> Option<f64> {
        self.deltas.read().get(symbol).copied()
    }

    /// Number of successful writes, including overwrites.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Number of symbols with a stored delta.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.read().is_empty()
    }

    /// Make every subsequent write fail with a connection error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

#[async_trait]
impl DeltaStorePort for InMemoryDeltaStore {
    async fn put_delta(&self, record: &DeltaRecord) -> Result<(), DeltaStoreError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(DeltaStoreError::ConnectionError {
                message: "store unavailable".to_string(),
            });
        }

        self.deltas
            .write()
            .insert(record.sort_key().to_string(), record.delta());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Symbol;

    fn record(symbol: &str, delta: f64) -> DeltaRecord {
        DeltaRecord::new(Symbol::new(symbol).unwrap(), delta)
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryDeltaStore::new();

        store.put_delta(&record("AAPL", 2.5)).await.unwrap();
        store.put_delta(&record("AAPL", -1.0)).await.unwrap();

        assert_eq!(store.delta("AAPL"), Some(-1.0));
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failing_store_rejects_writes() {
        let store = InMemoryDeltaStore::new();
        store.set_failing(true);

        let result = store.put_delta(&record("AAPL", 2.5)).await;

        assert!(matches!(result, Err(DeltaStoreError::ConnectionError { .. })));
        assert!(store.is_empty());
        assert_eq!(store.write_count(), 0);
    }
}
