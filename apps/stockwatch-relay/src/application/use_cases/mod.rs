//! Application Use Cases

mod dispatch_events;

pub use dispatch_events::{DispatchEventsUseCase, DispatchSettings};
