use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::FeedError;
use crate::factors::Factor;
use crate::indicators::IndicatorSet;
use marketpulse_market_data::{Priority, Quote, Symbol};

/// Scheduler cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: Symbol,
    pub priority: Priority,
}

impl CacheKey {
    pub fn new(symbol: Symbol, priority: Priority) -> Self {
        Self { symbol, priority }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.symbol, self.priority)
    }
}

/// Everything a consumer receives on a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub quote: Quote,
    pub indicators: IndicatorSet,
    pub factors: Vec<Factor>,
}

impl MarketSnapshot {
    /// Copy with the quote flagged degraded.
    pub fn degraded(&self) -> Self {
        Self {
            quote: self.quote.clone().into_degraded(),
            indicators: self.indicators.clone(),
            factors: self.factors.clone(),
        }
    }
}

/// One published refresh outcome.
pub type FeedUpdate = Result<Arc<MarketSnapshot>, FeedError>;

/// Point-in-time scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub entries: usize,
    pub subscribers: usize,
    pub in_flight: usize,
}
