use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::client::{build_client, get_json};
use super::HttpProviderConfig;
use crate::errors::MarketDataError;
use crate::models::{Priority, ProviderQuote, Symbol};
use crate::provider::QuoteProvider;

/// Quote provider backed by an upstream HTTP quote service.
///
/// Calls `GET {base_url}/quote/{symbol}?priority={high|normal}` and expects
/// a single [`ProviderQuote`] JSON object.
pub struct HttpQuoteProvider {
    config: HttpProviderConfig,
    client: Client,
}

impl HttpQuoteProvider {
    pub fn new(config: HttpProviderConfig) -> Self {
        let client = build_client(config.timeout());
        Self { config, client }
    }

    fn quote_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/quote/{}",
            self.config.base_url,
            urlencoding::encode(symbol.as_str())
        )
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn priority(&self) -> u8 {
        self.config.priority
    }

    fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    async fn get_quote(
        &self,
        symbol: &Symbol,
        priority: Priority,
    ) -> Result<ProviderQuote, MarketDataError> {
        let url = self.quote_url(symbol);
        get_json(
            &self.client,
            &self.config.id,
            &url,
            symbol.as_str(),
            &[("priority", priority.as_str().to_string())],
            self.config.api_key.as_deref(),
        )
        .await
    }
}
