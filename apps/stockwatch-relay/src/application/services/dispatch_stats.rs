//! Dispatch statistics shared with the health endpoint.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use serde::Serialize;

/// Running counters across dispatch invocations.
#[derive(Debug, Default)]
pub struct DispatchStats {
    batches: AtomicU64,
    records: AtomicU64,
    failed_records: AtomicU64,
    events_published: AtomicU64,
    transport_failures: AtomicU64,
    consecutive_transport_failures: AtomicU32,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    /// Batches dispatched.
    pub batches: u64,
    /// Records received.
    pub records: u64,
    /// Records reported as failed.
    pub failed_records: u64,
    /// Events accepted by the bus.
    pub events_published: u64,
    /// Store or bus calls that failed outright.
    pub transport_failures: u64,
    /// Transport failures since the last successful round trip.
    pub consecutive_transport_failures: u32,
}

impl DispatchStats {
    /// Create zeroed stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished batch.
    pub fn record_batch(&self, records: usize, failed: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.records.fetch_add(records as u64, Ordering::Relaxed);
        self.failed_records
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Record events accepted by the bus.
    pub fn record_published(&self, count: usize) {
        self.events_published
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a store or bus call that failed outright.
    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
        self.consecutive_transport_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful round trip to the store or bus.
    pub fn record_transport_success(&self) {
        self.consecutive_transport_failures
            .store(0, Ordering::Relaxed);
    }

    /// Take a snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            failed_records: self.failed_records.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            consecutive_transport_failures: self
                .consecutive_transport_failures
                .load(Ordering::Relaxed),
        }
    }
}
