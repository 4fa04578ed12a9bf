//! Delta Store Port (Driven Port)
//!
//! Interface for upserting derived delta records into the symbol table.
//! Writes are unconditional: the last write for a symbol wins.

use async_trait::async_trait;

use crate::domain::delta::DeltaRecord;

/// Delta store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeltaStoreError {
    /// Connection error.
    #[error("Delta store connection error: {message}")]
    ConnectionError { message: String },

    /// The store rejected the write.
    #[error("Delta write rejected: {message}")]
    WriteRejected { message: String },
}

/// Port for persisting delta records.
#[async_trait]
pub trait DeltaStorePort: Send + Sync {
    /// Upsert the delta record for its symbol, overwriting any previous one.
    async fn put_delta(&self, record: &DeltaRecord) -> Result<(), DeltaStoreError>;
}
