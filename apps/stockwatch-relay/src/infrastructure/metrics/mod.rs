//! Prometheus Metrics Module
//!
//! Exposes dispatch metrics in Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Records**: Received, failed and skipped change records
//! - **Writes**: Delta upserts sent to the store
//! - **Publishing**: Events accepted by the bus and publish failures
//! - **Latency**: Time spent dispatching a batch
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::classification::RecordKind;
use crate::domain::events::EventType;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "stockwatch_records_received_total",
        "Change records received, by classification"
    );
    describe_counter!(
        "stockwatch_records_failed_total",
        "Change records reported for redelivery, by reason"
    );
    describe_counter!(
        "stockwatch_records_skipped_total",
        "Change records with an unrecognized partition key"
    );

    describe_counter!(
        "stockwatch_delta_writes_total",
        "Delta records upserted to the store"
    );

    describe_counter!(
        "stockwatch_events_published_total",
        "Events accepted by the bus, by event type"
    );
    describe_counter!(
        "stockwatch_publish_failures_total",
        "Failed store or bus interactions, by reason"
    );

    describe_histogram!(
        "stockwatch_dispatch_seconds",
        "Time to dispatch one batch of change records"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a change record received, labeled by its classification.
pub fn record_received(kind: RecordKind) {
    counter!(
        "stockwatch_records_received_total",
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Record a change record reported as failed.
pub fn record_failed(reason: &'static str) {
    counter!(
        "stockwatch_records_failed_total",
        "reason" => reason
    )
    .increment(1);
}

/// Record a change record skipped as unknown.
pub fn record_skipped() {
    counter!("stockwatch_records_skipped_total").increment(1);
}

/// Record a delta upsert.
pub fn record_delta_written() {
    counter!("stockwatch_delta_writes_total").increment(1);
}

/// Record an event accepted by the bus.
pub fn record_event_published(event_type: EventType) {
    counter!(
        "stockwatch_events_published_total",
        "event_type" => event_type.as_str()
    )
    .increment(1);
}

/// Record a failed store or bus interaction.
pub fn record_publish_failure(reason: &'static str) {
    counter!(
        "stockwatch_publish_failures_total",
        "reason" => reason
    )
    .increment(1);
}

/// Record batch dispatch duration.
pub fn record_dispatch_duration(duration: Duration) {
    histogram!("stockwatch_dispatch_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
