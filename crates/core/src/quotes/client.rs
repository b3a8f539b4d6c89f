//! Market Data Client - Facade for the market-data crate.
//!
//! This module provides a clean interface between the scheduler and the
//! market-data crate's provider system.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Core Layer                           │
//! │                                                               │
//! │  RefreshScheduler ───────────────────────────▶ Quote          │
//! │         │                                        ▲            │
//! │         ▼                                        │            │
//! │  ┌─────────────────────────────────────────────────────────┐ │
//! │  │                   MarketDataClient                      │ │
//! │  │                                                         │ │
//! │  │  ProviderConfig ─▶ HttpQuoteProvider ─▶ ProviderRegistry │ │
//! │  └─────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::QuoteSource;
use crate::errors::{Error, Result};
use marketpulse_market_data::{
    HistoryProvider, HttpHistoryProvider, HttpProviderConfig, HttpQuoteProvider, PriceBar,
    Priority, ProviderRegistry, Quote, QuoteProvider, Symbol, DEFAULT_ATTEMPT_TIMEOUT,
};

/// Identifier used for the historical bar store.
const HISTORY_PROVIDER_ID: &str = "BARS";

/// Provider configuration for initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider ID (e.g., "PRIMARY", "LEGACY")
    pub id: String,
    pub base_url: String,
    /// Lower = tried earlier
    pub priority: u8,
    /// Per-attempt timeout; `None` uses the registry default
    pub timeout_ms: Option<u64>,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, priority: u8) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            priority,
            timeout_ms: None,
            api_key: None,
        }
    }

    fn to_http_config(&self) -> HttpProviderConfig {
        let mut config = HttpProviderConfig::new(&self.id, &self.base_url, self.priority);
        config.timeout_ms = self
            .timeout_ms
            .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT.as_millis() as u64);
        config.api_key = self.api_key.clone();
        config
    }
}

/// Market data client - facade for fetching quotes via the market-data crate.
///
/// Handles:
/// - Provider initialization from configuration
/// - Coordinating with the market-data ProviderRegistry
/// - Mapping market-data errors into core errors
pub struct MarketDataClient {
    registry: ProviderRegistry,
}

impl MarketDataClient {
    /// Create a client with HTTP providers in the given order.
    ///
    /// Fails when no provider is configured or a base URL is empty.
    pub fn new(providers: Vec<ProviderConfig>, history_url: Option<String>) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::InvalidConfigValue(
                "at least one quote provider is required".to_string(),
            ));
        }

        let mut quote_providers: Vec<Arc<dyn QuoteProvider>> = Vec::new();
        for config in &providers {
            if config.base_url.trim().is_empty() {
                return Err(Error::InvalidConfigValue(format!(
                    "provider {} has no base URL",
                    config.id
                )));
            }
            info!(
                "Initialized quote provider: {} (priority {})",
                config.id, config.priority
            );
            quote_providers.push(Arc::new(HttpQuoteProvider::new(config.to_http_config())));
        }

        let mut registry = ProviderRegistry::new(quote_providers);
        match history_url {
            Some(url) if !url.trim().is_empty() => {
                info!("Historical bar store: {}", url);
                let history: Arc<dyn HistoryProvider> = Arc::new(HttpHistoryProvider::new(
                    HttpProviderConfig::new(HISTORY_PROVIDER_ID, url, 0),
                ));
                registry = registry.with_history(history);
            }
            _ => warn!("No historical bar store configured; indicators will be unavailable"),
        }

        Ok(Self { registry })
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn providers(&self) -> Vec<&str> {
        self.registry.providers().iter().map(|p| p.id()).collect()
    }

    pub fn provider_count(&self) -> usize {
        self.registry.providers().len()
    }

    /// Fetch a quote, never failing: a zeroed degraded quote stands in when
    /// every provider fails.
    pub async fn fetch_latest_quote(&self, symbol: &Symbol, priority: Priority) -> Quote {
        self.registry.fetch_quote(symbol, priority).await
    }
}

#[async_trait]
impl QuoteSource for MarketDataClient {
    async fn fetch_quote(&self, symbol: &Symbol, priority: Priority) -> Result<Quote> {
        Ok(self.registry.try_fetch_quote(symbol, priority).await?)
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        Ok(self.registry.fetch_history(symbol, start, end).await?)
    }
}

/// Lossy conversion for indicator math. Out-of-range values map to zero.
pub fn price_as_f64(price: Decimal) -> f64 {
    price.to_f64().unwrap_or(0.0)
}
