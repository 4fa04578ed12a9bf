//! Record Classification
//!
//! Decides what a change record represents from its partition key alone.
//! The raw key is inspected exactly once, here; everything downstream
//! matches on [`RecordKind`].
//!
//! # Feedback Invariant
//!
//! Derived delta records are written back into the same table whose change
//! log feeds this pipeline. A record under the `DELTA` partition always
//! classifies as [`RecordKind::Delta`], so it is turned into a delta event
//! and never differenced again. Breaking this would make every delta write
//! trigger another delta write.

use crate::domain::change_record::ChangeRecord;

/// Partition key of price records.
pub const PRICE_PARTITION: &str = "PRICE";

/// Partition key of derived delta records.
pub const DELTA_PARTITION: &str = "DELTA";

/// What a change record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A symbol price update.
    Price,
    /// A derived price delta update.
    Delta,
    /// Any other key shape. Skipped without being reported as a failure.
    Unknown,
}

impl RecordKind {
    /// Classify a change record by its partition key.
    #[must_use]
    pub fn of(record: &ChangeRecord) -> Self {
        Self::from_partition_key(&record.key.partition_key)
    }

    /// Classify a raw partition key. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_partition_key(partition_key: &str) -> Self {
        match partition_key {
            PRICE_PARTITION => Self::Price,
            DELTA_PARTITION => Self::Delta,
            _ => Self::Unknown,
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Delta => "delta",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a change record.
#[must_use]
pub fn classify(record: &ChangeRecord) -> RecordKind {
    RecordKind::of(record)
}
