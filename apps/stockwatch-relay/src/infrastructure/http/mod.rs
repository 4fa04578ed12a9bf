//! JSON-over-HTTP Client
//!
//! Shared transport for the store and event bus adapters. Each call is a
//! single POST carrying a JSON body and an operation target header.
//!
//! The client has no request timeout and never retries: redelivery of the
//! whole batch is left to the stream runtime.

mod error;

pub use error::HttpAdapterError;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header naming the remote operation.
pub const TARGET_HEADER: &str = "X-Amz-Target";

/// Content type of the JSON protocol.
pub const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Minimal JSON-over-HTTP client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    client: Client,
    endpoint: String,
}

impl JsonHttpClient {
    /// Create a client for an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or the client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HttpAdapterError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(HttpAdapterError::Http("endpoint cannot be empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| HttpAdapterError::Network(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// The endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke `target` with `body` and decode the JSON response.
    ///
    /// An empty response body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpAdapterError::Network`] if the request cannot be sent,
    /// [`HttpAdapterError::Api`] on a non-success status and
    /// [`HttpAdapterError::JsonParse`] if the response cannot be decoded.
    #[allow(clippy::future_not_send)]
    pub async fn call<T: DeserializeOwned, B: Serialize>(
        &self,
        target: &str,
        body: &B,
    ) -> Result<T, HttpAdapterError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(TARGET_HEADER, target)
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(body)
            .send()
            .await
            .map_err(|e| HttpAdapterError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpAdapterError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(HttpAdapterError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| HttpAdapterError::JsonParse(e.to_string()))
    }
}

/// Pull a message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("Message"))
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
