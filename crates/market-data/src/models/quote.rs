use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;
use super::types::DATA_SOURCE_NONE;

/// Normalized market data quote.
///
/// Every field is always populated; values a provider did not supply are
/// zero. `degraded` marks a fallback or stale substitute so it is never
/// indistinguishable from a live value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub open: Decimal,
    pub previous_close: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Provider id that produced the value, or `"none"`.
    pub data_source: String,
    /// Wall time of the upstream attempt that produced the value.
    pub latency_ms: u64,
    pub degraded: bool,
}

impl Quote {
    /// Zeroed placeholder returned when no provider could produce a value.
    pub fn unavailable(symbol: Symbol, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol,
            price: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            volume: Decimal::ZERO,
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            open: Decimal::ZERO,
            previous_close: Decimal::ZERO,
            timestamp,
            data_source: DATA_SOURCE_NONE.to_string(),
            latency_ms: 0,
            degraded: true,
        }
    }

    /// True for the zeroed placeholder produced by [`Quote::unavailable`].
    pub fn is_unavailable(&self) -> bool {
        self.data_source == DATA_SOURCE_NONE
    }

    /// Copy of this quote flagged as degraded.
    pub fn into_degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}

/// Raw quote payload as returned by an upstream provider.
///
/// Only `price` is required; the registry normalizes the rest.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuote {
    pub price: Decimal,
    #[serde(default)]
    pub change: Option<Decimal>,
    #[serde(default, alias = "changePct")]
    pub change_percent: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    #[serde(default)]
    pub open: Option<Decimal>,
    #[serde(default)]
    pub previous_close: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ProviderQuote {
    /// Build a fully-populated [`Quote`] from this payload.
    ///
    /// Missing change fields are derived from `previous_close`; they are zero
    /// when no previous close is known.
    pub fn normalize(
        self,
        symbol: Symbol,
        data_source: &str,
        latency_ms: u64,
        fetched_at: DateTime<Utc>,
    ) -> Quote {
        let previous_close = self.previous_close.unwrap_or(Decimal::ZERO);

        let change = self.change.unwrap_or_else(|| {
            if previous_close > Decimal::ZERO {
                self.price - previous_close
            } else {
                Decimal::ZERO
            }
        });

        let change_percent = self.change_percent.unwrap_or_else(|| {
            if previous_close > Decimal::ZERO {
                (change / previous_close * Decimal::ONE_HUNDRED).round_dp(4)
            } else {
                Decimal::ZERO
            }
        });

        Quote {
            symbol,
            price: self.price,
            change,
            change_percent,
            volume: self.volume.unwrap_or(Decimal::ZERO),
            high: self.high.unwrap_or(Decimal::ZERO),
            low: self.low.unwrap_or(Decimal::ZERO),
            open: self.open.unwrap_or(Decimal::ZERO),
            previous_close,
            timestamp: self.timestamp.unwrap_or(fetched_at),
            data_source: data_source.to_string(),
            latency_ms,
            degraded: false,
        }
    }
}
