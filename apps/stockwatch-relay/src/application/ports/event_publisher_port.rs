//! Event Publisher Port (Driven Port)
//!
//! Interface for publishing symbol events to the downstream bus in one
//! batched call.
//!
//! Each [`PublishEntry`] carries the serialized event plus routing
//! attributes that subscribers filter on. The attributes are always derived
//! from the event itself, so they cannot drift from the payload.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::events::SymbolEvent;

/// Default event source identifier.
pub const DEFAULT_EVENT_SOURCE: &str = "stockwatch";

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    ConnectionError { message: String },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError { message: String },

    /// Publishing failed.
    #[error("Event publish failed: {message}")]
    PublishFailed { message: String },
}

/// A routing attribute value. Exactly one data type per attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageAttribute {
    /// String attribute.
    String(String),
    /// Number attribute.
    Number(f64),
}

impl MessageAttribute {
    /// Data type name on the wire.
    #[must_use]
    pub const fn data_type(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Number(_) => "Number",
        }
    }

    /// Attribute value rendered as text.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// One entry of a batched publish call.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishEntry {
    /// Event source identifier.
    pub source: String,
    /// Detail type (`SymbolPriceEvent` / `SymbolPriceDeltaEvent`).
    pub detail_type: String,
    /// Serialized event JSON.
    pub detail: String,
    /// Target bus. `None` targets the default bus.
    pub event_bus_name: Option<String>,
    /// Routing attributes for subscriber-side filtering.
    pub attributes: BTreeMap<String, MessageAttribute>,
}

impl PublishEntry {
    /// Build a publish entry for an event.
    ///
    /// Attributes: `symbol` and `type` as strings, plus `price` or
    /// `price_delta` as a number.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError::SerializationError`] if the event cannot
    /// be serialized.
    pub fn from_event(
        event: &SymbolEvent,
        source: &str,
        event_bus_name: Option<&str>,
    ) -> Result<Self, EventPublishError> {
        let detail =
            serde_json::to_string(event).map_err(|e| EventPublishError::SerializationError {
                message: e.to_string(),
            })?;

        let event_type = event.event_type();
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "symbol".to_string(),
            MessageAttribute::String(event.symbol().as_str().to_string()),
        );
        attributes.insert(
            "type".to_string(),
            MessageAttribute::String(event_type.as_str().to_string()),
        );
        attributes.insert(
            event_type.as_str().to_string(),
            MessageAttribute::Number(event.value()),
        );

        Ok(Self {
            source: source.to_string(),
            detail_type: event_type.detail_type().to_string(),
            detail,
            event_bus_name: event_bus_name.map(ToString::to_string),
            attributes,
        })
    }
}

/// Result for one entry of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryResult {
    /// Entry accepted by the bus.
    Accepted {
        /// Bus-assigned event ID.
        event_id: String,
    },
    /// Entry rejected by the bus.
    Rejected {
        /// Error code reported by the bus.
        error_code: String,
        /// Error message reported by the bus.
        error_message: String,
    },
}

impl EntryResult {
    /// Check if the entry was rejected.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Outcome of a publish call that reached the bus.
///
/// `entries` are positionally aligned with the request entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Number of entries the bus rejected.
    pub failed_entry_count: usize,
    /// Per-entry results, in request order.
    pub entries: Vec<EntryResult>,
}

impl PublishOutcome {
    /// Outcome where every entry was accepted.
    #[must_use]
    pub fn accepted(event_ids: Vec<String>) -> Self {
        Self {
            failed_entry_count: 0,
            entries: event_ids
                .into_iter()
                .map(|event_id| EntryResult::Accepted { event_id })
                .collect(),
        }
    }

    /// Check if every entry was accepted.
    ///
    /// A zero failure count does not override a rejected entry.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_entry_count == 0 && !self.entries.iter().any(EntryResult::is_rejected)
    }
}

/// Port for publishing symbol events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish a batch of entries in a single call.
    ///
    /// `Err` means the call itself failed and nothing can be assumed about
    /// delivery. Partial rejection is reported through [`PublishOutcome`].
    async fn publish_events(
        &self,
        entries: Vec<PublishEntry>,
    ) -> Result<PublishOutcome, EventPublishError>;
}
