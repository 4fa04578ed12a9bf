//! Price Delta Calculation
//!
//! Derives `after.Price - before.Price` from a price record and produces the
//! delta record that is upserted back into the store under
//! `{PK: "DELTA", SK: <symbol>}`.
//!
//! The calculation is pure. Persisting the result is the dispatcher's job,
//! through the delta store port, and it overwrites any previous delta for
//! the symbol (last write wins).

use crate::domain::change_record::{ChangeRecord, ImageSide, PRICE_ATTRIBUTE};
use crate::domain::classification::DELTA_PARTITION;
use crate::domain::shared::{RecordError, Symbol};

/// Derived delta record for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRecord {
    symbol: Symbol,
    delta: f64,
}

impl DeltaRecord {
    /// Create a delta record.
    #[must_use]
    pub const fn new(symbol: Symbol, delta: f64) -> Self {
        Self { symbol, delta }
    }

    /// Partition key of every delta record.
    #[must_use]
    pub const fn partition_key(&self) -> &'static str {
        DELTA_PARTITION
    }

    /// Sort key: the symbol whose price changed.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        self.symbol.as_str()
    }

    /// The symbol whose price changed.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Price difference, new minus old.
    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }
}

/// Compute the delta record for a price change.
///
/// Both `before.Price` and `after.Price` must be present and numeric. A
/// first write of a symbol has no before image and always fails here; it can
/// never succeed on redelivery either.
///
/// # Errors
///
/// - [`RecordError::MissingField`] if either price is absent or not numeric.
/// - [`RecordError::EmptySymbol`] if the record's sort key is empty.
/// - [`RecordError::NonFiniteDelta`] if the difference overflows.
pub fn compute_delta(record: &ChangeRecord) -> Result<DeltaRecord, RecordError> {
    let old_price = record
        .number(ImageSide::Before, PRICE_ATTRIBUTE)
        .ok_or(RecordError::missing(ImageSide::Before, PRICE_ATTRIBUTE))?;

    let new_price = record
        .number(ImageSide::After, PRICE_ATTRIBUTE)
        .ok_or(RecordError::missing(ImageSide::After, PRICE_ATTRIBUTE))?;

    let symbol = Symbol::new(record.symbol())?;

    let delta = new_price - old_price;
    if !delta.is_finite() {
        return Err(RecordError::NonFiniteDelta {
            before: old_price,
            after: new_price,
        });
    }

    Ok(DeltaRecord::new(symbol, delta))
}
