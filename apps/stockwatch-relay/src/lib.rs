#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! StockWatch Relay - Change Stream to Domain Event Dispatcher
//!
//! Consumes change-stream batches from the symbol price table, derives
//! price deltas, and publishes typed price events to the event bus. Each
//! batch is answered with the list of records the stream runtime must
//! redeliver.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure record handling
//!   - `change_record`: Change records, images and typed attribute values
//!   - `classification`: Price / Delta / Unknown from the partition key
//!   - `delta`: Price delta calculation
//!   - `events`: Price and price delta events
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Delta store and event publisher interfaces
//!   - `use_cases`: Batch dispatch
//!   - `dto`: Batch failure report
//!   - `services`: Dispatch statistics
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `stream`: Change stream codec
//!   - `store`, `event_bus`, `http`: Store and bus adapters
//!   - `intake`: Batch intake HTTP endpoint
//!   - `config`, `health`, `metrics`, `telemetry`: Service plumbing
//!
//! # Data Flow
//!
//! ```text
//!                                ┌──────────────┐
//!                       ┌──────► │ Delta Store  │  PK=DELTA, SK=<symbol>
//! Stream batch ──► Dispatcher    └──────────────┘
//!   (intake)        │   │        ┌──────────────┐
//!                   │   └──────► │  Event Bus   │  price / price_delta
//!                   ▼            └──────────────┘
//!           batch failure report
//! ```
//!
//! Delta records written back to the table flow through the stream again
//! and are published as price delta events. They are never differenced a
//! second time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Pure record handling with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::change_record::{
    AttributeValue, ChangeKey, ChangeKind, ChangeRecord, Image, ImageSide, RecordId,
};
pub use domain::classification::{RecordKind, classify};
pub use domain::delta::{DeltaRecord, compute_delta};
pub use domain::events::{
    EventType, PriceDeltaEvent, PriceEvent, SymbolEvent, build_price_delta_event,
    build_price_event,
};
pub use domain::shared::{RecordError, Symbol};

// Application
pub use application::dto::{BatchFailureReport, BatchItemFailure};
pub use application::ports::{
    DeltaStoreError, DeltaStorePort, EventPublishError, EventPublisherPort, PublishEntry,
    PublishOutcome,
};
pub use application::use_cases::{DispatchEventsUseCase, DispatchSettings};

// Infrastructure config
pub use infrastructure::config::{
    AdapterSettings, Backend, ConfigError, HttpEndpoints, PublishSettings, RelayConfig,
    ServerSettings,
};

// Stream codec
pub use infrastructure::stream::{StreamDecodeError, decode_batch};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
