//! HTTP delta store adapter implementing `DeltaStorePort`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::ports::{DeltaStoreError, DeltaStorePort};
use crate::domain::change_record::{DELTA_ATTRIBUTE, PARTITION_KEY_ATTRIBUTE, SORT_KEY_ATTRIBUTE};
use crate::domain::delta::DeltaRecord;
use crate::infrastructure::http::{HttpAdapterError, JsonHttpClient};
use crate::infrastructure::stream::WireAttributeValue;

/// Operation target for item upserts.
pub const PUT_ITEM_TARGET: &str = "DynamoDB_20120810.PutItem";

/// `PutItem` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutItemRequest<'a> {
    table_name: &'a str,
    item: BTreeMap<&'static str, WireAttributeValue>,
}

/// Delta store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeltaStore {
    client: JsonHttpClient,
    table_name: String,
}

impl HttpDeltaStore {
    /// Create a store adapter for a table at an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        endpoint: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Result<Self, HttpAdapterError> {
        Ok(Self {
            client: JsonHttpClient::new(endpoint)?,
            table_name: table_name.into(),
        })
    }

    /// Encode the item: `PK` and `SK` as strings, `Delta` as a number.
    fn to_item(record: &DeltaRecord) -> BTreeMap<&'static str, WireAttributeValue> {
        BTreeMap::from([
            (
                PARTITION_KEY_ATTRIBUTE,
                WireAttributeValue::string(record.partition_key()),
            ),
            (
                SORT_KEY_ATTRIBUTE,
                WireAttributeValue::string(record.sort_key()),
            ),
            (DELTA_ATTRIBUTE, WireAttributeValue::number(record.delta())),
        ])
    }
}

#[async_trait]
impl DeltaStorePort for HttpDeltaStore {
    async fn put_delta(&self, record: &DeltaRecord) -> Result<(), DeltaStoreError> {
        let request = PutItemRequest {
            table_name: &self.table_name,
            item: Self::to_item(record),
        };

        let _: Option<serde_json::Value> = self
            .client
            .call(PUT_ITEM_TARGET, &request)
            .await
            .map_err(DeltaStoreError::from)?;

        tracing::debug!(
            table = %self.table_name,
            symbol = %record.symbol(),
            delta = record.delta(),
            "Delta item written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::shared::Symbol;
    use crate::infrastructure::http::TARGET_HEADER;

    fn aapl(delta: f64) -> DeltaRecord {
        DeltaRecord::new(Symbol::new("AAPL").unwrap(), delta)
    }

    #[tokio::test]
    async fn put_delta_sends_single_typed_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(TARGET_HEADER, PUT_ITEM_TARGET))
            .and(body_json(serde_json::json!({
                "TableName": "stockwatch",
                "Item": {
                    "PK": {"S": "DELTA"},
                    "SK": {"S": "AAPL"},
                    "Delta": {"N": "2.5"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpDeltaStore::new(server.uri(), "stockwatch").unwrap();
        store.put_delta(&aapl(2.5)).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_write_maps_to_write_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Requested resource not found"})),
            )
            .mount(&server)
            .await;

        let store = HttpDeltaStore::new(server.uri(), "missing").unwrap();
        let err = store.put_delta(&aapl(1.0)).await.unwrap_err();

        assert!(matches!(err, DeltaStoreError::WriteRejected { .. }));
    }

    #[tokio::test]
    async fn unreachable_store_is_connection_error() {
        let store = HttpDeltaStore::new("http://127.0.0.1:1", "stockwatch").unwrap();
        let err = store.put_delta(&aapl(1.0)).await.unwrap_err();

        assert!(matches!(err, DeltaStoreError::ConnectionError { .. }));
    }
}
