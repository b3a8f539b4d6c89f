use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Maximum accepted ticker length (covers index and FX tickers like `^GSPC`, `EURUSD=X`).
const MAX_SYMBOL_LEN: usize = 15;

/// Validated, upper-cased ticker symbol.
///
/// Symbols are cheap to clone and are used as part of the scheduler cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Parse and normalize a raw symbol.
    ///
    /// Leading/trailing whitespace is trimmed and letters are upper-cased.
    /// Accepts 1-15 characters of `A-Z`, `0-9`, `.`, `-`, `^` and `=`; the
    /// first character must be alphanumeric or `^`.
    pub fn parse(raw: &str) -> Result<Self, MarketDataError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() || normalized.len() > MAX_SYMBOL_LEN {
            return Err(MarketDataError::InvalidSymbol(raw.to_string()));
        }

        let mut chars = normalized.chars();
        let first_ok = chars
            .next()
            .map(|c| c.is_ascii_alphanumeric() || c == '^')
            .unwrap_or(false);
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

        if !first_ok || !rest_ok {
            return Err(MarketDataError::InvalidSymbol(raw.to_string()));
        }

        Ok(Self(Arc::from(normalized)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
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
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0.to_string()
    }
}
