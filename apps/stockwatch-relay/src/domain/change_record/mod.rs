//! Change Record Types
//!
//! A change record is the before/after image pair the store's change log
//! emits for one `{PK, SK}` key. Records are immutable once delivered; the
//! pipeline only reads them.
//!
//! Attribute values keep the store's typing: a value is a string, a number
//! (kept as its decimal text, the way the store transmits it), or some other
//! store type that this pipeline never reads.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Attribute Names
// =============================================================================

/// Partition key attribute of the symbol table.
pub const PARTITION_KEY_ATTRIBUTE: &str = "PK";

/// Sort key attribute of the symbol table.
pub const SORT_KEY_ATTRIBUTE: &str = "SK";

/// Price attribute on `PRICE` records.
pub const PRICE_ATTRIBUTE: &str = "Price";

/// Delta attribute on `DELTA` records.
pub const DELTA_ATTRIBUTE: &str = "Delta";

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque identifier of a change record, reported back for redelivery.
///
/// This is the record's stream sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record ID.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Attribute Values and Images
// =============================================================================

/// A typed attribute value from a change image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value, as transmitted by the store.
    N(String),
    /// Any other store type (bool, null, list, map, binary, sets).
    Other,
}

impl AttributeValue {
    /// Create a number value from an `f64`.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::N(value.to_string())
    }

    /// Read this value as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            Self::N(_) | Self::Other => None,
        }
    }

    /// Read this value as a number.
    ///
    /// Returns `None` for non-number values and for number text that does
    /// not parse as a finite `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::N(n) => n.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::S(_) | Self::Other => None,
        }
    }
}

/// Which image of a change record a value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSide {
    /// The change key tuple.
    Keys,
    /// The image before the change.
    Before,
    /// The image after the change.
    After,
}

impl ImageSide {
    /// Get the side name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Keys => "keys",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for ImageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute map of one side of a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    attributes: HashMap<String, AttributeValue>,
}

impl Image {
    /// Create an empty image.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string attribute.
    #[must_use]
    pub fn with_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into(), AttributeValue::S(value.into()));
        self
    }

    /// Add a number attribute.
    #[must_use]
    pub fn with_number(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes
            .insert(name.into(), AttributeValue::number(value));
        self
    }

    /// Insert an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Get a raw attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get a numeric attribute.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttributeValue::as_f64)
    }

    /// Get a string attribute.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the image has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for Image {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Change Record
// =============================================================================

/// Kind of change the store reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeKind {
    /// A new item was written.
    Insert,
    /// An existing item was overwritten.
    #[default]
    Modify,
    /// An item was deleted.
    Remove,
}

impl ChangeKind {
    /// Parse the stream's event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "INSERT" => Some(Self::Insert),
            "MODIFY" => Some(Self::Modify),
            "REMOVE" => Some(Self::Remove),
            _ => None,
        }
    }

    /// Get the stream's event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Modify => "MODIFY",
            Self::Remove => "REMOVE",
        }
    }
}

/// The `{PK, SK}` key tuple of a changed item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeKey {
    /// Partition key value.
    pub partition_key: String,
    /// Sort key value (the symbol for price and delta records).
    pub sort_key: String,
}

impl ChangeKey {
    /// Create a new change key.
    #[must_use]
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// A before/after snapshot pair for one store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Record identifier used in failure reports.
    pub id: RecordId,
    /// Stream event identifier, kept for logging.
    pub event_id: String,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Changed item key.
    pub key: ChangeKey,
    /// Image before the change (absent on insert).
    pub before: Option<Image>,
    /// Image after the change (absent on remove).
    pub after: Option<Image>,
}

impl ChangeRecord {
    /// Create a record with no images.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, key: ChangeKey) -> Self {
        let id = id.into();
        Self {
            event_id: id.as_str().to_string(),
            id,
            kind: ChangeKind::default(),
            key,
            before: None,
            after: None,
        }
    }

    /// Set the before image.
    #[must_use]
    pub fn with_before(mut self, image: Image) -> Self {
        self.before = Some(image);
        self
    }

    /// Set the after image.
    #[must_use]
    pub fn with_after(mut self, image: Image) -> Self {
        self.after = Some(image);
        self
    }

    /// Set the change kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ChangeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the stream event ID.
    #[must_use]
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    /// Get the image on one side of the change.
    #[must_use]
    pub const fn image(&self, side: ImageSide) -> Option<&Image> {
        match side {
            ImageSide::Keys => None,
            ImageSide::Before => self.before.as_ref(),
            ImageSide::After => self.after.as_ref(),
        }
    }

    /// Read a numeric attribute from one image.
    #[must_use]
    pub fn number(&self, side: ImageSide, name: &str) -> Option<f64> {
        self.image(side).and_then(|image| image.number(name))
    }

    /// The symbol carried by the change key.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.key.sort_key
    }
}
