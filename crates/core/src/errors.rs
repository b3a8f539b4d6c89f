//! Core error types for MarketPulse.
//!
//! [`Error`] covers everything that can go wrong inside the crate. Consumers of
//! the scheduler never see it directly: refresh outcomes are published as
//! [`FeedError`], which is cheap to clone and fan out.

use serde::Serialize;
use thiserror::Error;

use marketpulse_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid market calendar: {0}")]
    Calendar(String),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the failure is about the symbol itself, not the upstream.
    ///
    /// Symbol errors are terminal: retrying cannot change the outcome.
    pub fn is_symbol_error(&self) -> bool {
        matches!(self, Error::MarketData(e) if e.is_symbol_error())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Calendar(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

/// Consumer-visible outcome of a failed refresh.
///
/// Published to subscribers in place of a snapshot. Nothing else crosses the
/// subscription boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedError {
    /// Every provider failed and there is no previous value to fall back on.
    #[error("No data source could provide {symbol}")]
    SourceUnavailable { symbol: String },

    /// Upstreams do not know the symbol.
    #[error("Invalid symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    /// The first fetch for the key has not completed yet.
    #[error("No value for {symbol} yet")]
    Pending { symbol: String },

    /// Nobody is subscribed to the key.
    #[error("{symbol} is not tracked")]
    NotTracked { symbol: String },
}

impl FeedError {
    pub fn symbol(&self) -> &str {
        match self {
            FeedError::SourceUnavailable { symbol }
            | FeedError::InvalidSymbol { symbol }
            | FeedError::Pending { symbol }
            | FeedError::NotTracked { symbol } => symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_error_passthrough() {
        let err: Error = MarketDataError::SymbolNotFound("ZZZZ".to_string()).into();
        assert!(err.is_symbol_error());

        let err: Error = MarketDataError::AllProvidersFailed.into();
        assert!(!err.is_symbol_error());
    }

    #[test]
    fn test_feed_error_serializes_with_kind_tag() {
        let err = FeedError::SourceUnavailable {
            symbol: "AAPL".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "sourceUnavailable");
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(err.symbol(), "AAPL");
    }
}
