//! Per-record errors for the relay pipeline.
//!
//! These are data-quality conditions (a first write without a previous
//! price, a blank sort key). They are converted into batch failure entries
//! by the dispatcher and never abort an invocation.

use crate::domain::change_record::ImageSide;

/// Error raised while turning one change record into a delta or an event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// A required attribute is absent, or present with the wrong type.
    #[error("missing field {image}.{field}")]
    MissingField {
        /// Image the attribute was read from.
        image: ImageSide,
        /// Attribute name.
        field: &'static str,
    },

    /// The record's symbol is empty.
    #[error("empty symbol")]
    EmptySymbol,

    /// Both prices are finite but their difference is not representable.
    #[error("price delta overflows: {before} -> {after}")]
    NonFiniteDelta {
        /// Price before the change.
        before: f64,
        /// Price after the change.
        after: f64,
    },
}

impl RecordError {
    /// Shorthand for a [`RecordError::MissingField`].
    #[must_use]
    pub const fn missing(image: ImageSide, field: &'static str) -> Self {
        Self::MissingField { image, field }
    }

    /// Stable reason label, used for logs and metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::EmptySymbol => "empty_symbol",
            Self::NonFiniteDelta { .. } => "non_finite_delta",
        }
    }
}
