//! Batch Intake (Driver Adapter)
//!
//! Axum endpoint through which the stream runtime hands over change-stream
//! batches.
//!
//! # Endpoints
//!
//! - `POST /invocations` - Dispatch one stream batch, answer with the
//!   batch failure report
//!
//! An undecodable body is answered with 400 and nothing is dispatched; the
//! runtime redelivers the whole batch.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router, body::Bytes, extract::State, http::StatusCode, response::IntoResponse,
    response::Response, routing::post,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{DeltaStorePort, EventPublisherPort};
use crate::application::use_cases::DispatchEventsUseCase;
use crate::infrastructure::stream::decode_batch;

/// State shared across intake handlers.
pub struct IntakeState<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    /// Batch dispatcher.
    pub dispatcher: Arc<DispatchEventsUseCase<S, P>>,
}

impl<S, P> IntakeState<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    /// Create intake state around a dispatcher.
    #[must_use]
    pub const fn new(dispatcher: Arc<DispatchEventsUseCase<S, P>>) -> Self {
        Self { dispatcher }
    }
}

impl<S, P> Clone for IntakeState<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

/// Error body for rejected requests.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the intake router.
pub fn create_router<S, P>(state: IntakeState<S, P>) -> Router
where
    S: DeltaStorePort + 'static,
    P: EventPublisherPort + 'static,
{
    Router::new()
        .route("/invocations", post(invoke))
        .with_state(state)
}

async fn invoke<S, P>(State(state): State<IntakeState<S, P>>, body: Bytes) -> Response
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    let records = match decode_batch(&body) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting undecodable stream batch");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let report = state.dispatcher.dispatch(&records).await;
    (StatusCode::OK, Json(report)).into_response()
}

// =============================================================================
// Intake Server
// =============================================================================

/// HTTP server accepting stream batches.
pub struct IntakeServer<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    port: u16,
    state: IntakeState<S, P>,
    cancel: CancellationToken,
}

impl<S, P> IntakeServer<S, P>
where
    S: DeltaStorePort + 'static,
    P: EventPublisherPort + 'static,
{
    /// Create a new intake server.
    #[must_use]
    pub const fn new(port: u16, state: IntakeState<S, P>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the intake server until cancelled.
    ///
    /// In-flight batches are allowed to finish before the server stops.
    ///
    /// # Errors
    ///
    /// Returns `IntakeServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), IntakeServerError> {
        let app = create_router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| IntakeServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Intake server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| IntakeServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Intake server stopped");
        Ok(())
    }
}

/// Intake server errors.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::application::use_cases::DispatchSettings;
    use crate::infrastructure::event_bus::InMemoryEventBus;
    use crate::infrastructure::store::InMemoryDeltaStore;

    fn router() -> (Router, Arc<InMemoryEventBus>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let dispatcher = DispatchEventsUseCase::new(
            Arc::new(InMemoryDeltaStore::new()),
            Arc::clone(&bus),
            DispatchSettings::default(),
        );
        (
            create_router(IntakeState::new(Arc::new(dispatcher))),
            bus,
        )
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/invocations")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn empty_batch_reports_no_failures() {
        let (app, bus) = router();

        let response = app.oneshot(post(r#"{"Records":[]}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json(response).await,
            serde_json::json!({"batchItemFailures": []})
        );
        assert_eq!(bus.publish_calls(), 0);
    }

    #[tokio::test]
    async fn first_write_is_reported_by_sequence_number() {
        let (app, bus) = router();
        let body = r#"{"Records":[{"eventID":"1","eventName":"INSERT","dynamodb":{
            "Keys":{"PK":{"S":"PRICE"},"SK":{"S":"AAPL"}},
            "NewImage":{"PK":{"S":"PRICE"},"SK":{"S":"AAPL"},"Price":{"N":"102.5"}},
            "SequenceNumber":"4200"}}]}"#;

        let response = app.oneshot(post(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json(response).await,
            serde_json::json!({"batchItemFailures": [{"itemIdentifier": "4200"}]})
        );
        assert_eq!(bus.publish_calls(), 0);
    }

    #[tokio::test]
    async fn undecodable_body_is_bad_request() {
        let (app, bus) = router();

        let response = app.oneshot(post("not a batch")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["error"].is_string());
        assert_eq!(bus.publish_calls(), 0);
    }
}
