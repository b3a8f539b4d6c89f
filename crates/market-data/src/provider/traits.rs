//! Market data provider trait definitions.
//!
//! This module defines the traits that upstream quote sources and the
//! historical bar store implement.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{PriceBar, Priority, ProviderQuote, Symbol};

/// Default per-attempt timeout applied by the registry.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);

/// Trait for upstream quote providers.
///
/// Implement this trait to add a new quote source. The registry uses the
/// provider's priority to order the fallback chain and its timeout to bound
/// each attempt.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use marketpulse_market_data::provider::QuoteProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_quote(
///         &self,
///         symbol: &Symbol,
///         priority: Priority,
///     ) -> Result<ProviderQuote, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging, circuit breaker tracking, and as the `data_source`
    /// stamped on normalized quotes.
    fn id(&self) -> &str;

    /// Provider priority for ordering.
    ///
    /// Lower values = tried earlier. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Upper bound for a single attempt against this provider.
    fn timeout(&self) -> Duration {
        DEFAULT_ATTEMPT_TIMEOUT
    }

    /// Fetch the latest quote for a symbol.
    ///
    /// `priority` is forwarded upstream as a token; providers may use it to
    /// pick a faster or cheaper path.
    async fn get_quote(
        &self,
        symbol: &Symbol,
        priority: Priority,
    ) -> Result<ProviderQuote, MarketDataError>;
}

/// Trait for the historical bar store.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Fetch bars for the inclusive date range, ordered by timestamp ascending.
    async fn get_bars(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}
