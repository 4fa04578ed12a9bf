//! Typed attribute values as they appear on the wire.
//!
//! `{"S": "AAPL"}` is a string, `{"N": "102.5"}` is a number. Any other
//! store type, or a value claiming more than one type, decodes to
//! [`AttributeValue::Other`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::change_record::{AttributeValue, Image};

/// Wire form of a typed attribute value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAttributeValue {
    /// String value.
    #[serde(rename = "S", default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    /// Number value, as text.
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
}

impl WireAttributeValue {
    /// A string-typed value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            s: Some(value.into()),
            n: None,
        }
    }

    /// A number-typed value.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self {
            s: None,
            n: Some(value.to_string()),
        }
    }

    /// Convert a wire map into an image.
    #[must_use]
    pub fn into_image(map: HashMap<String, Self>) -> Image {
        map.into_iter()
            .map(|(name, value)| (name, AttributeValue::from(value)))
            .collect()
    }
}

impl From<WireAttributeValue> for AttributeValue {
    fn from(value: WireAttributeValue) -> Self {
        match (value.s, value.n) {
            (Some(s), None) => Self::S(s),
            (None, Some(n)) => Self::N(n),
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_encodes_single_type() {
        let json = serde_json::to_value(WireAttributeValue::number(2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"N": "2.5"}));
    }

    #[test]
    fn string_encodes_single_type() {
        let json = serde_json::to_value(WireAttributeValue::string("AAPL")).unwrap();
        assert_eq!(json, serde_json::json!({"S": "AAPL"}));
    }

    #[test]
    fn decodes_typed_values() {
        let s: WireAttributeValue = serde_json::from_str(r#"{"S":"AAPL"}"#).unwrap();
        let n: WireAttributeValue = serde_json::from_str(r#"{"N":"102.5"}"#).unwrap();

        assert_eq!(AttributeValue::from(s), AttributeValue::S("AAPL".to_string()));
        assert_eq!(AttributeValue::from(n), AttributeValue::N("102.5".to_string()));
    }

    #[test]
    fn other_store_types_are_opaque() {
        let flag: WireAttributeValue = serde_json::from_str(r#"{"BOOL":true}"#).unwrap();
        let both: WireAttributeValue = serde_json::from_str(r#"{"S":"1","N":"1"}"#).unwrap();

        assert_eq!(AttributeValue::from(flag), AttributeValue::Other);
        assert_eq!(AttributeValue::from(both), AttributeValue::Other);
    }
}
