//! Symbol Domain Events
//!
//! Typed, validated payloads published for downstream consumers:
//!
//! ```json
//! {"type": "price", "symbol": "AAPL", "price": 102.5}
//! {"type": "price_delta", "symbol": "AAPL", "delta": 2.5}
//! ```
//!
//! The `type` discriminant comes from the enum variant, so it can only be
//! set by choosing a constructor. Every event carries a non-empty symbol;
//! this holds for events built from change records and for events
//! deserialized from JSON.

use serde::{Deserialize, Serialize};

use crate::domain::change_record::{
    ChangeRecord, DELTA_ATTRIBUTE, ImageSide, PRICE_ATTRIBUTE,
};
use crate::domain::shared::{RecordError, Symbol};

// =============================================================================
// Event Types
// =============================================================================

/// Discriminant of a [`SymbolEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A new symbol price.
    Price,
    /// A new symbol price delta.
    PriceDelta,
}

impl EventType {
    /// Wire value of the `type` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::PriceDelta => "price_delta",
        }
    }

    /// Detail type used when publishing to the bus.
    #[must_use]
    pub const fn detail_type(&self) -> &'static str {
        match self {
            Self::Price => "SymbolPriceEvent",
            Self::PriceDelta => "SymbolPriceDeltaEvent",
        }
    }
}

/// All events the relay publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SymbolEvent {
    /// Symbol price changed.
    #[serde(rename = "price")]
    Price(PriceEvent),
    /// Symbol price delta changed.
    #[serde(rename = "price_delta")]
    PriceDelta(PriceDeltaEvent),
}

impl SymbolEvent {
    /// Get the event discriminant.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Price(_) => EventType::Price,
            Self::PriceDelta(_) => EventType::PriceDelta,
        }
    }

    /// Get the event's symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::Price(e) => &e.symbol,
            Self::PriceDelta(e) => &e.symbol,
        }
    }

    /// Get the event's numeric value (the price or the delta).
    #[must_use]
    pub const fn value(&self) -> f64 {
        match self {
            Self::Price(e) => e.price,
            Self::PriceDelta(e) => e.delta,
        }
    }
}

impl From<PriceEvent> for SymbolEvent {
    fn from(event: PriceEvent) -> Self {
        Self::Price(event)
    }
}

impl From<PriceDeltaEvent> for SymbolEvent {
    fn from(event: PriceDeltaEvent) -> Self {
        Self::PriceDelta(event)
    }
}

/// Event: symbol price changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEvent {
    symbol: Symbol,
    price: f64,
}

impl PriceEvent {
    /// Create a price event.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptySymbol`] if `symbol` is empty.
    pub fn new(symbol: impl Into<String>, price: f64) -> Result<Self, RecordError> {
        Ok(Self {
            symbol: Symbol::new(symbol)?,
            price,
        })
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// New price.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }
}

/// Event: symbol price delta changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDeltaEvent {
    symbol: Symbol,
    delta: f64,
}

impl PriceDeltaEvent {
    /// Create a price delta event.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptySymbol`] if `symbol` is empty.
    pub fn new(symbol: impl Into<String>, delta: f64) -> Result<Self, RecordError> {
        Ok(Self {
            symbol: Symbol::new(symbol)?,
            delta,
        })
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// New delta.
    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Build a price event from a `PRICE` change record.
///
/// Reads the post-change `Price` and the key's symbol.
///
/// # Errors
///
/// - [`RecordError::MissingField`] if `after.Price` is absent or not numeric.
/// - [`RecordError::EmptySymbol`] if the key's symbol is empty.
pub fn build_price_event(record: &ChangeRecord) -> Result<PriceEvent, RecordError> {
    let price = record
        .number(ImageSide::After, PRICE_ATTRIBUTE)
        .ok_or(RecordError::missing(ImageSide::After, PRICE_ATTRIBUTE))?;

    PriceEvent::new(record.symbol(), price)
}

/// Build a price delta event from a `DELTA` change record.
///
/// # Errors
///
/// - [`RecordError::MissingField`] if `after.Delta` is absent or not numeric.
/// - [`RecordError::EmptySymbol`] if the key's symbol is empty.
pub fn build_price_delta_event(record: &ChangeRecord) -> Result<PriceDeltaEvent, RecordError> {
    let delta = record
        .number(ImageSide::After, DELTA_ATTRIBUTE)
        .ok_or(RecordError::missing(ImageSide::After, DELTA_ATTRIBUTE))?;

    PriceDeltaEvent::new(record.symbol(), delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change_record::{ChangeKey, Image};

    fn record(partition: &str, symbol: &str, after: Image) -> ChangeRecord {
        ChangeRecord::new("seq-1", ChangeKey::new(partition, symbol)).with_after(after)
    }

    #[test]
    fn builds_price_event_from_after_image() {
        let record = record("PRICE", "AAPL", Image::new().with_number(PRICE_ATTRIBUTE, 102.5))
            .with_before(Image::new().with_number(PRICE_ATTRIBUTE, 100.0));

        let event = build_price_event(&record).unwrap();
        assert_eq!(event.symbol().as_str(), "AAPL");
        assert_eq!(event.price(), 102.5);
    }

    #[test]
    fn price_event_needs_after_price() {
        let record = ChangeRecord::new("seq-1", ChangeKey::new("PRICE", "AAPL"))
            .with_before(Image::new().with_number(PRICE_ATTRIBUTE, 100.0));

        assert_eq!(
            build_price_event(&record),
            Err(RecordError::missing(ImageSide::After, PRICE_ATTRIBUTE))
        );
    }

    #[test]
    fn builds_delta_event() {
        let record = record("DELTA", "AAPL", Image::new().with_number(DELTA_ATTRIBUTE, 2.5));

        let event = build_price_delta_event(&record).unwrap();
        assert_eq!(event.symbol().as_str(), "AAPL");
        assert_eq!(event.delta(), 2.5);
    }

    #[test]
    fn delta_event_needs_delta_field() {
        let record = record("DELTA", "AAPL", Image::new().with_number(PRICE_ATTRIBUTE, 1.0));

        assert_eq!(
            build_price_delta_event(&record),
            Err(RecordError::missing(ImageSide::After, DELTA_ATTRIBUTE))
        );
    }

    #[test]
    fn empty_symbol_fails_with_valid_numbers() {
        let price = record("PRICE", "", Image::new().with_number(PRICE_ATTRIBUTE, 1.0));
        let delta = record("DELTA", "", Image::new().with_number(DELTA_ATTRIBUTE, 1.0));

        assert_eq!(build_price_event(&price), Err(RecordError::EmptySymbol));
        assert_eq!(build_price_delta_event(&delta), Err(RecordError::EmptySymbol));
        assert_eq!(PriceEvent::new("", 1.0), Err(RecordError::EmptySymbol));
        assert_eq!(PriceDeltaEvent::new("", 1.0), Err(RecordError::EmptySymbol));
    }

    #[test]
    fn serializes_with_type_discriminant() {
        let event = SymbolEvent::from(PriceEvent::new("AAPL", 102.5).unwrap());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "price", "symbol": "AAPL", "price": 102.5})
        );

        let event = SymbolEvent::from(PriceDeltaEvent::new("AAPL", 2.5).unwrap());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "price_delta", "symbol": "AAPL", "delta": 2.5})
        );
    }

    #[test]
    fn deserialize_dispatches_on_type() {
        let event: SymbolEvent =
            serde_json::from_str(r#"{"type":"price_delta","symbol":"ETH","delta":-3.0}"#).unwrap();

        assert_eq!(event.event_type(), EventType::PriceDelta);
        assert_eq!(event.symbol().as_str(), "ETH");
        assert_eq!(event.value(), -3.0);
    }

    #[test]
    fn deserialize_rejects_empty_symbol() {
        let result: Result<SymbolEvent, _> =
            serde_json::from_str(r#"{"type":"price","symbol":"","price":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn event_type_labels() {
        assert_eq!(EventType::Price.as_str(), "price");
        assert_eq!(EventType::PriceDelta.as_str(), "price_delta");
        assert_eq!(EventType::Price.detail_type(), "SymbolPriceEvent");
        assert_eq!(EventType::PriceDelta.detail_type(), "SymbolPriceDeltaEvent");
    }
}
