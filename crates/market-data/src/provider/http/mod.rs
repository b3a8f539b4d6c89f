//! HTTP providers for the upstream quote services and the historical bar store.
//!
//! All upstream services share the same contract: `GET` per symbol, JSON
//! body on 2xx, anything else is a provider failure.

mod client;
mod history;
mod quote;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use history::HttpHistoryProvider;
pub use quote::HttpQuoteProvider;

use super::DEFAULT_ATTEMPT_TIMEOUT;

/// Connection settings for one HTTP upstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpProviderConfig {
    /// Provider id (e.g. "PRIMARY", "SECONDARY", "LEGACY").
    pub id: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Lower value = tried earlier.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional bearer token sent as `Authorization`.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_priority() -> u8 {
    10
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT.as_millis() as u64
}

impl HttpProviderConfig {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, priority: u8) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            priority,
            timeout_ms: default_timeout_ms(),
            api_key: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
