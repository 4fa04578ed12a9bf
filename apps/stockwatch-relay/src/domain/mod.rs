//! Domain Layer - Change records, classification, deltas, and events.
//!
//! This layer contains the pure pipeline logic with no I/O. Everything here
//! is synchronous and deterministic.

/// Change record types (keys, images, attribute values).
pub mod change_record;

/// Partition-key classification of change records.
pub mod classification;

/// Price delta calculation.
pub mod delta;

/// Typed symbol events and their builders.
pub mod events;

/// Shared value objects and errors.
pub mod shared;
