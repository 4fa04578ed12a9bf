//! Data Transfer Objects returned to the invoking runtime.

mod batch_report;

pub use batch_report::{BatchFailureReport, BatchItemFailure};
