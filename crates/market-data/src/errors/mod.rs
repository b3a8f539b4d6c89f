//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the provider registry should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The symbol is malformed and was rejected before any request.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The requested symbol is unknown to the provider (HTTP 404).
    /// Other providers are still tried; when every provider reports it the
    /// registry surfaces it as terminal.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider explicitly throttled the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The attempt exceeded its per-provider timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a non-success status or failed the request.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered 2xx but the payload could not be parsed.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that returned the payload
        provider: String,
        /// Parser error
        message: String,
    },

    /// The circuit breaker is open for this provider.
    #[error("Circuit open: {provider}")]
    CircuitOpen {
        /// The provider with an open circuit
        provider: String,
    },

    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// No providers are configured.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// All providers were tried and all failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use marketpulse_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "PRIMARY".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::FailoverWithPenalty);
    ///
    /// let error = MarketDataError::InvalidSymbol("A B".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::InvalidSymbol(_) => RetryClass::Never,

            Self::RateLimited { .. } | Self::Timeout { .. } | Self::ValidationFailed { .. } => {
                RetryClass::FailoverWithPenalty
            }

            Self::SymbolNotFound(_)
            | Self::ProviderError { .. }
            | Self::MalformedPayload { .. }
            | Self::Network(_) => RetryClass::NextProvider,

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,

            // Exhaustion is transient from the scheduler's point of view
            Self::NoProvidersAvailable | Self::AllProvidersFailed => RetryClass::NextProvider,
        }
    }

    /// True when the symbol itself is the problem.
    ///
    /// The scheduler does not retry these.
    pub fn is_symbol_error(&self) -> bool {
        matches!(self, Self::InvalidSymbol(_) | Self::SymbolNotFound(_))
    }
}
