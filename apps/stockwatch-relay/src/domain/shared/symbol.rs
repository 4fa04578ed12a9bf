//! Symbol value object for watched instruments.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordError;

/// A watched symbol, taken verbatim from the store's sort key.
///
/// Examples: `"AAPL"`, `"BINANCE:BTCUSDT"`.
///
/// Unlike order symbols, watched symbols are not case-normalized: the store
/// key is the identity, and rewriting it would split a symbol's price and
/// delta records across two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptySymbol`] if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, RecordError> {
        let value = value.into();
        if value.is_empty() {
            return Err(RecordError::EmptySymbol);
        }
        Ok(Self(value))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = RecordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
