//! HTTP event bus adapter implementing `EventPublisherPort`.

use async_trait::async_trait;

use super::api_types::{PutEventsRequest, PutEventsRequestEntry, PutEventsResponse};
use crate::application::ports::{
    EventPublishError, EventPublisherPort, PublishEntry, PublishOutcome,
};
use crate::infrastructure::http::{HttpAdapterError, JsonHttpClient};

/// Operation target for batched event publishing.
pub const PUT_EVENTS_TARGET: &str = "AWSEvents.PutEvents";

/// Event bus reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventBusPublisher {
    client: JsonHttpClient,
}

impl HttpEventBusPublisher {
    /// Create a publisher for a bus endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HttpAdapterError> {
        Ok(Self {
            client: JsonHttpClient::new(endpoint)?,
        })
    }
}

#[async_trait]
impl EventPublisherPort for HttpEventBusPublisher {
    async fn publish_events(
        &self,
        entries: Vec<PublishEntry>,
    ) -> Result<PublishOutcome, EventPublishError> {
        let count = entries.len();
        let request = PutEventsRequest {
            entries: entries.into_iter().map(PutEventsRequestEntry::from).collect(),
        };

        let response: Option<PutEventsResponse> = self
            .client
            .call(PUT_EVENTS_TARGET, &request)
            .await
            .map_err(EventPublishError::from)?;
        let outcome = PublishOutcome::from(response.unwrap_or_default());

        tracing::debug!(
            entries = count,
            failed_entry_count = outcome.failed_entry_count,
            "PutEvents completed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::application::ports::{DEFAULT_EVENT_SOURCE, EntryResult};
    use crate::domain::events::{PriceDeltaEvent, PriceEvent, SymbolEvent};
    use crate::infrastructure::http::TARGET_HEADER;

    fn entries() -> Vec<PublishEntry> {
        let price = SymbolEvent::from(PriceEvent::new("AAPL", 102.5).unwrap());
        let delta = SymbolEvent::from(PriceDeltaEvent::new("AAPL", 2.5).unwrap());
        vec![
            PublishEntry::from_event(&price, DEFAULT_EVENT_SOURCE, None).unwrap(),
            PublishEntry::from_event(&delta, DEFAULT_EVENT_SOURCE, Some("prices")).unwrap(),
        ]
    }

    #[tokio::test]
    async fn publishes_entries_with_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(TARGET_HEADER, PUT_EVENTS_TARGET))
            .and(body_json(serde_json::json!({
                "Entries": [
                    {
                        "Source": "stockwatch",
                        "DetailType": "SymbolPriceEvent",
                        "Detail": r#"{"type":"price","symbol":"AAPL","price":102.5}"#,
                        "Attributes": {
                            "price": {"DataType": "Number", "StringValue": "102.5"},
                            "symbol": {"DataType": "String", "StringValue": "AAPL"},
                            "type": {"DataType": "String", "StringValue": "price"}
                        }
                    },
                    {
                        "Source": "stockwatch",
                        "DetailType": "SymbolPriceDeltaEvent",
                        "Detail": r#"{"type":"price_delta","symbol":"AAPL","delta":2.5}"#,
                        "EventBusName": "prices",
                        "Attributes": {
                            "price_delta": {"DataType": "Number", "StringValue": "2.5"},
                            "symbol": {"DataType": "String", "StringValue": "AAPL"},
                            "type": {"DataType": "String", "StringValue": "price_delta"}
                        }
                    }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "FailedEntryCount": 0,
                "Entries": [{"EventId": "e-1"}, {"EventId": "e-2"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = HttpEventBusPublisher::new(server.uri()).unwrap();
        let outcome = publisher.publish_events(entries()).await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(
            outcome.entries,
            vec![
                EntryResult::Accepted {
                    event_id: "e-1".to_string()
                },
                EntryResult::Accepted {
                    event_id: "e-2".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn partial_rejection_is_reported_positionally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "FailedEntryCount": 1,
                "Entries": [
                    {"EventId": "e-1"},
                    {"ErrorCode": "InternalFailure", "ErrorMessage": "try again"}
                ]
            })))
            .mount(&server)
            .await;

        let publisher = HttpEventBusPublisher::new(server.uri()).unwrap();
        let outcome = publisher.publish_events(entries()).await.unwrap();

        assert_eq!(outcome.failed_entry_count, 1);
        assert!(!outcome.entries[0].is_rejected());
        assert_eq!(
            outcome.entries[1],
            EntryResult::Rejected {
                error_code: "InternalFailure".to_string(),
                error_message: "try again".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_publish_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let publisher = HttpEventBusPublisher::new(server.uri()).unwrap();
        let err = publisher.publish_events(entries()).await.unwrap_err();

        assert!(matches!(err, EventPublishError::PublishFailed { .. }));
    }

    #[tokio::test]
    async fn malformed_response_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let publisher = HttpEventBusPublisher::new(server.uri()).unwrap();
        let err = publisher.publish_events(entries()).await.unwrap_err();

        assert!(matches!(err, EventPublishError::ConnectionError { .. }));
    }
}
