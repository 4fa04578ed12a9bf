//! Stream batch decoding.

use std::collections::HashMap;

use serde::Deserialize;

use super::attribute::WireAttributeValue;
use crate::domain::change_record::{
    ChangeKey, ChangeKind, ChangeRecord, PARTITION_KEY_ATTRIBUTE, SORT_KEY_ATTRIBUTE,
};

/// Stream decoding error.
#[derive(Debug, thiserror::Error)]
pub enum StreamDecodeError {
    /// Body is not a valid stream batch.
    #[error("invalid stream batch: {0}")]
    InvalidJson(String),

    /// A record carries no sequence number to report it by.
    #[error("record {event_id} has no sequence number")]
    MissingSequenceNumber {
        /// Stream event ID of the record.
        event_id: String,
    },

    /// A record carries an event name other than INSERT, MODIFY or REMOVE.
    #[error("record {event_id} has unknown event name {event_name:?}")]
    UnknownEventName {
        /// Stream event ID of the record.
        event_id: String,
        /// The unrecognized event name.
        event_name: String,
    },
}

/// A batch of stream records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamBatch {
    /// Records in delivery order.
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

/// One stream record.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecord {
    /// Stream event ID.
    #[serde(rename = "eventID", default)]
    pub event_id: String,
    /// `INSERT`, `MODIFY` or `REMOVE`.
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    /// Change payload.
    pub dynamodb: StreamChange,
}

/// Change payload of a stream record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamChange {
    /// Primary key attributes.
    #[serde(default)]
    pub keys: HashMap<String, WireAttributeValue>,
    /// Item after the change.
    #[serde(default)]
    pub new_image: Option<HashMap<String, WireAttributeValue>>,
    /// Item before the change.
    #[serde(default)]
    pub old_image: Option<HashMap<String, WireAttributeValue>>,
    /// Position of the record in its shard.
    #[serde(default)]
    pub sequence_number: Option<String>,
}

impl StreamBatch {
    /// Convert every record into a change record, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that has no sequence number or an unknown
    /// event name.
    pub fn into_records(self) -> Result<Vec<ChangeRecord>, StreamDecodeError> {
        self.records
            .into_iter()
            .map(StreamRecord::into_change_record)
            .collect()
    }
}

impl StreamRecord {
    /// Convert into a change record.
    ///
    /// A missing key attribute decodes as an empty string. Classification
    /// and event building reject it downstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no sequence number or an unknown
    /// event name.
    pub fn into_change_record(self) -> Result<ChangeRecord, StreamDecodeError> {
        let Self {
            event_id,
            event_name,
            dynamodb,
        } = self;

        let Some(kind) = ChangeKind::from_event_name(&event_name) else {
            return Err(StreamDecodeError::UnknownEventName {
                event_id,
                event_name,
            });
        };

        let Some(sequence_number) = dynamodb.sequence_number.filter(|s| !s.is_empty()) else {
            return Err(StreamDecodeError::MissingSequenceNumber { event_id });
        };

        let keys = WireAttributeValue::into_image(dynamodb.keys);
        let key = ChangeKey::new(
            keys.string(PARTITION_KEY_ATTRIBUTE).unwrap_or_default(),
            keys.string(SORT_KEY_ATTRIBUTE).unwrap_or_default(),
        );

        let mut record = ChangeRecord::new(sequence_number, key)
            .with_kind(kind)
            .with_event_id(event_id);
        if let Some(image) = dynamodb.old_image {
            record = record.with_before(WireAttributeValue::into_image(image));
        }
        if let Some(image) = dynamodb.new_image {
            record = record.with_after(WireAttributeValue::into_image(image));
        }
        Ok(record)
    }
}

/// Decode a stream batch body into change records.
///
/// # Errors
///
/// Returns an error if the body is not a valid batch or any record cannot be
/// converted.
pub fn decode_batch(body: &[u8]) -> Result<Vec<ChangeRecord>, StreamDecodeError> {
    let batch: StreamBatch =
        serde_json::from_slice(body).map_err(|e| StreamDecodeError::InvalidJson(e.to_string()))?;
    batch.into_records()
}
