//! HTTP adapter error types.

use thiserror::Error;

use crate::application::ports::{DeltaStoreError, EventPublishError};

/// Errors from the JSON-over-HTTP adapters.
#[derive(Debug, Error, Clone)]
pub enum HttpAdapterError {
    /// Request could not be built.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl From<HttpAdapterError> for DeltaStoreError {
    fn from(err: HttpAdapterError) -> Self {
        match err {
            HttpAdapterError::Http(msg)
            | HttpAdapterError::Network(msg)
            | HttpAdapterError::JsonParse(msg) => Self::ConnectionError { message: msg },
            HttpAdapterError::Api { status, message } => Self::WriteRejected {
                message: format!("{status}: {message}"),
            },
        }
    }
}

impl From<HttpAdapterError> for EventPublishError {
    fn from(err: HttpAdapterError) -> Self {
        match err {
            HttpAdapterError::Http(msg)
            | HttpAdapterError::Network(msg)
            | HttpAdapterError::JsonParse(msg) => Self::ConnectionError { message: msg },
            HttpAdapterError::Api { status, message } => Self::PublishFailed {
                message: format!("{status}: {message}"),
            },
        }
    }
}
