//! Event Bus Adapters
//!
//! Implementations of [`EventPublisherPort`](crate::application::ports::EventPublisherPort):
//!
//! - `HttpEventBusPublisher`: `PutEvents` over the JSON-over-HTTP protocol
//! - `InMemoryEventBus`: recording bus with bounded retention and scripted failures

mod api_types;
mod http;
mod in_memory;

pub use http::{HttpEventBusPublisher, PUT_EVENTS_TARGET};
pub use in_memory::{DEFAULT_RETAINED_ENTRIES, InMemoryEventBus};
