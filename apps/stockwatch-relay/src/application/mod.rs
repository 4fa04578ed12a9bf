//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the dispatch use case and the port interfaces
//! that define how the pipeline reaches the store and the event bus.

/// Data transfer objects returned to the invoking runtime.
pub mod dto;

/// Port interfaces for external systems (store, event bus).
pub mod ports;

/// Application services shared across use cases.
pub mod services;

/// Use cases (batch dispatch).
pub mod use_cases;
