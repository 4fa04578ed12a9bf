//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `DeltaStorePort`: Upserts derived delta records into the symbol table
//! - `EventPublisherPort`: Publishes symbol events to the downstream bus

mod delta_store_port;
mod event_publisher_port;

pub use delta_store_port::{DeltaStoreError, DeltaStorePort};
pub use event_publisher_port::{
    DEFAULT_EVENT_SOURCE, EntryResult, EventPublishError, EventPublisherPort, MessageAttribute,
    PublishEntry, PublishOutcome,
};
