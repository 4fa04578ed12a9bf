//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the driver adapters that feed
//! batches into the dispatcher.

/// Configuration loading.
pub mod config;

/// Event bus adapters (HTTP and in-memory).
pub mod event_bus;

/// Health check HTTP endpoint.
pub mod health;

/// Shared JSON-over-HTTP client.
pub mod http;

/// Batch intake HTTP endpoint.
pub mod intake;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Delta store adapters (HTTP and in-memory).
pub mod store;

/// Change stream codec.
pub mod stream;

/// OpenTelemetry tracing integration.
pub mod telemetry;
