//! `PutEvents` wire types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::ports::{EntryResult, MessageAttribute, PublishEntry, PublishOutcome};

/// `PutEvents` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsRequest {
    pub entries: Vec<PutEventsRequestEntry>,
}

/// One request entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsRequestEntry {
    pub source: String,
    pub detail_type: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_bus_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, WireMessageAttribute>,
}

/// Routing attribute on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireMessageAttribute {
    pub data_type: &'static str,
    pub string_value: String,
}

impl From<&MessageAttribute> for WireMessageAttribute {
    fn from(attribute: &MessageAttribute) -> Self {
        Self {
            data_type: attribute.data_type(),
            string_value: attribute.string_value(),
        }
    }
}

impl From<PublishEntry> for PutEventsRequestEntry {
    fn from(entry: PublishEntry) -> Self {
        Self {
            attributes: entry
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), WireMessageAttribute::from(value)))
                .collect(),
            source: entry.source,
            detail_type: entry.detail_type,
            detail: entry.detail,
            event_bus_name: entry.event_bus_name,
        }
    }
}

/// `PutEvents` response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResponse {
    #[serde(default)]
    pub failed_entry_count: usize,
    #[serde(default)]
    pub entries: Vec<PutEventsResultEntry>,
}

/// Per-entry result, in request order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResultEntry {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl From<PutEventsResultEntry> for EntryResult {
    fn from(entry: PutEventsResultEntry) -> Self {
        match entry.error_code {
            Some(error_code) => Self::Rejected {
                error_code,
                error_message: entry.error_message.unwrap_or_default(),
            },
            None => Self::Accepted {
                event_id: entry.event_id.unwrap_or_default(),
            },
        }
    }
}

impl From<PutEventsResponse> for PublishOutcome {
    fn from(response: PutEventsResponse) -> Self {
        Self {
            failed_entry_count: response.failed_entry_count,
            entries: response.entries.into_iter().map(EntryResult::from).collect(),
        }
    }
}
