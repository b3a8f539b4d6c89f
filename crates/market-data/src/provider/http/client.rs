//! Shared request plumbing for the HTTP providers.

use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;

/// Build a client whose own timeout matches the provider's attempt budget.
pub(super) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Make a GET request and decode the JSON body.
///
/// Non-2xx statuses and undecodable bodies map to provider failures.
pub(super) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: &str,
    subject: &str,
    query: &[(&str, String)],
    api_key: Option<&str>,
) -> Result<T, MarketDataError> {
    let mut request = client.get(url).query(query);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    debug!("{} request: {} with {} params", provider, url, query.len());

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            MarketDataError::Timeout {
                provider: provider.to_string(),
            }
        } else {
            MarketDataError::ProviderError {
                provider: provider.to_string(),
                message: format!("Request failed: {}", e),
            }
        }
    })?;

    let status = response.status();
    if let Some(err) = classify_status(provider, status, subject) {
        return Err(err);
    }

    let body = response
        .text()
        .await
        .map_err(|e| MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("Failed to read body: {}", e),
        })?;

    decode_body(provider, &body)
}

/// Map an HTTP status to a provider error, `None` for success.
///
/// `subject` is the symbol the request was for; it names the 404 error.
pub(super) fn classify_status(
    provider: &str,
    status: StatusCode,
    subject: &str,
) -> Option<MarketDataError> {
    if status.is_success() {
        return None;
    }

    let err = match status {
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: provider.to_string(),
        },
        StatusCode::NOT_FOUND => MarketDataError::SymbolNotFound(subject.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => MarketDataError::Timeout {
            provider: provider.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: "Invalid or missing API key".to_string(),
        },
        other => MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("HTTP {}", other.as_u16()),
        },
    };

    Some(err)
}

pub(super) fn decode_body<T: DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::MalformedPayload {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}
