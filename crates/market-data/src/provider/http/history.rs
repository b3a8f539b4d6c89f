use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use reqwest::Client;

use super::client::{build_client, get_json};
use super::HttpProviderConfig;
use crate::errors::MarketDataError;
use crate::models::{PriceBar, Symbol};
use crate::provider::HistoryProvider;

/// Client for the historical bar store.
///
/// Calls `GET {base_url}/bars/{symbol}?start=YYYY-MM-DD&end=YYYY-MM-DD` and
/// expects a JSON array of [`PriceBar`].
pub struct HttpHistoryProvider {
    config: HttpProviderConfig,
    client: Client,
}

impl HttpHistoryProvider {
    pub fn new(config: HttpProviderConfig) -> Self {
        let client = build_client(config.timeout());
        Self { config, client }
    }
}

#[async_trait]
impl HistoryProvider for HttpHistoryProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    async fn get_bars(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let url = format!(
            "{}/bars/{}",
            self.config.base_url,
            urlencoding::encode(symbol.as_str())
        );
        let query = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];

        let bars: Vec<PriceBar> = get_json(
            &self.client,
            &self.config.id,
            &url,
            symbol.as_str(),
            &query,
            self.config.api_key.as_deref(),
        )
        .await?;

        Ok(ensure_ascending(symbol, bars))
    }
}

/// Sort bars by timestamp if the store returned them out of order.
pub(crate) fn ensure_ascending(symbol: &Symbol, mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let ordered = bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp);
    if !ordered {
        warn!(
            "History for {} arrived out of order ({} bars), sorting",
            symbol,
            bars.len()
        );
        bars.sort_by_key(|b| b.timestamp);
    }
    bars
}
