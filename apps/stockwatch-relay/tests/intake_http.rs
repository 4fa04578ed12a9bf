//! Intake Integration Tests
//!
//! Posts stream batches to the intake router with the HTTP store and bus
//! adapters pointed at mock endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stockwatch_relay::infrastructure::event_bus::{HttpEventBusPublisher, PUT_EVENTS_TARGET};
use stockwatch_relay::infrastructure::http::TARGET_HEADER;
use stockwatch_relay::infrastructure::intake::{IntakeState, create_router};
use stockwatch_relay::infrastructure::store::{HttpDeltaStore, PUT_ITEM_TARGET};
use stockwatch_relay::{DispatchEventsUseCase, DispatchSettings};

const BATCH: &str = r#"{"Records":[
    {"eventID":"a","eventName":"MODIFY","dynamodb":{
        "Keys":{"PK":{"S":"PRICE"},"SK":{"S":"AAPL"}},
        "OldImage":{"Price":{"N":"100"}},
        "NewImage":{"Price":{"N":"102.5"}},
        "SequenceNumber":"1001"}},
    {"eventID":"b","eventName":"INSERT","dynamodb":{
        "Keys":{"PK":{"S":"DELTA"},"SK":{"S":"MSFT"}},
        "NewImage":{"Delta":{"N":"-3.25"}},
        "SequenceNumber":"1002"}}
]}"#;

struct Endpoints {
    store: MockServer,
    bus: MockServer,
}

impl Endpoints {
    async fn start() -> Self {
        let store = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(TARGET_HEADER, PUT_ITEM_TARGET))
            .and(body_partial_json(serde_json::json!({
                "TableName": "stockwatch",
                "Item": {"PK": {"S": "DELTA"}, "SK": {"S": "AAPL"}, "Delta": {"N": "2.5"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&store)
            .await;

        Self {
            store,
            bus: MockServer::start().await,
        }
    }

    fn router(&self) -> Router {
        let store = Arc::new(HttpDeltaStore::new(self.store.uri(), "stockwatch").unwrap());
        let bus = Arc::new(HttpEventBusPublisher::new(self.bus.uri()).unwrap());
        let dispatcher = DispatchEventsUseCase::new(store, bus, DispatchSettings::default());
        create_router(IntakeState::new(Arc::new(dispatcher)))
    }
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/invocations")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn report(app: Router, body: &str) -> serde_json::Value {
    let response = app.oneshot(post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn batch_is_written_and_published() {
    let endpoints = Endpoints::start().await;
    Mock::given(method("POST"))
        .and(header(TARGET_HEADER, PUT_EVENTS_TARGET))
        .and(body_partial_json(serde_json::json!({
            "Entries": [
                {"Source": "stockwatch", "DetailType": "SymbolPriceEvent"},
                {"Source": "stockwatch", "DetailType": "SymbolPriceDeltaEvent"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "FailedEntryCount": 0,
            "Entries": [{"EventId": "e-1"}, {"EventId": "e-2"}]
        })))
        .expect(1)
        .mount(&endpoints.bus)
        .await;

    let json = report(endpoints.router(), BATCH).await;

    assert_eq!(json, serde_json::json!({"batchItemFailures": []}));
}

#[tokio::test]
async fn rejected_entry_reports_its_record() {
    let endpoints = Endpoints::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "FailedEntryCount": 1,
            "Entries": [
                {"EventId": "e-1"},
                {"ErrorCode": "ThrottlingException", "ErrorMessage": "slow down"}
            ]
        })))
        .mount(&endpoints.bus)
        .await;

    let json = report(endpoints.router(), BATCH).await;

    assert_eq!(
        json,
        serde_json::json!({"batchItemFailures": [{"itemIdentifier": "1002"}]})
    );
}

#[tokio::test]
async fn bus_outage_reports_every_record() {
    let endpoints = Endpoints::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&endpoints.bus)
        .await;

    let json = report(endpoints.router(), BATCH).await;

    assert_eq!(
        json,
        serde_json::json!({"batchItemFailures": [
            {"itemIdentifier": "1001"},
            {"itemIdentifier": "1002"}
        ]})
    );
}

#[tokio::test]
async fn store_outage_skips_publishing() {
    let store = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&store)
        .await;
    let bus = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&bus)
        .await;
    let endpoints = Endpoints { store, bus };

    let json = report(endpoints.router(), BATCH).await;

    assert_eq!(json["batchItemFailures"].as_array().unwrap().len(), 2);
}
