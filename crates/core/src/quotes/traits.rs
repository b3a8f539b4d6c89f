use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use marketpulse_market_data::{PriceBar, Priority, Quote, Symbol};

/// Where the scheduler gets live quotes and historical bars.
///
/// Implementations must not retry on their own: the scheduler owns the retry
/// policy and needs every failure reported.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch a reconciled quote, or the reason no provider produced one.
    async fn fetch_quote(&self, symbol: &Symbol, priority: Priority) -> Result<Quote>;

    /// Fetch ascending daily bars in `[start, end]`.
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>>;
}
