//! Shared domain types used across the relay pipeline.

mod errors;
mod symbol;

pub use errors::RecordError;
pub use symbol::Symbol;
