//! Delta Store Adapters
//!
//! Implementations of [`DeltaStorePort`](crate::application::ports::DeltaStorePort):
//!
//! - `HttpDeltaStore`: `PutItem` over the JSON-over-HTTP protocol
//! - `InMemoryDeltaStore`: process-local table for local runs and tests

mod http;
mod in_memory;

pub use http::{HttpDeltaStore, PUT_ITEM_TARGET};
pub use in_memory::InMemoryDeltaStore;
