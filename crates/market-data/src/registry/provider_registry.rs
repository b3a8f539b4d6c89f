//! Provider registry reconciling quotes across ordered upstreams.
//!
//! The registry manages the fallback chain, handling:
//! - Priority ordering of providers (primary, secondary, legacy)
//! - Per-attempt timeouts
//! - Circuit breaking for failing providers
//! - Normalization and validation of provider payloads
//! - Diagnostic tracking of every attempt

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::time::Instant;

use super::{CircuitBreaker, FetchDiagnostics, QuoteValidator, SkipReason};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{PriceBar, Priority, ProviderId, Quote, Symbol};
use crate::provider::{HistoryProvider, QuoteProvider};

/// Provider registry for reconciling quotes from ordered upstreams.
pub struct ProviderRegistry {
    /// Sorted by priority, ties keep registration order.
    providers: Vec<Arc<dyn QuoteProvider>>,
    history: Option<Arc<dyn HistoryProvider>>,
    circuit_breaker: CircuitBreaker,
    validator: QuoteValidator,
}

impl ProviderRegistry {
    /// Create a registry with default breaker and validator settings.
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self::with_config(providers, CircuitBreaker::new(), QuoteValidator::new())
    }

    /// Create a registry with custom configuration.
    pub fn with_config(
        mut providers: Vec<Arc<dyn QuoteProvider>>,
        circuit_breaker: CircuitBreaker,
        validator: QuoteValidator,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());

        Self {
            providers,
            history: None,
            circuit_breaker,
            validator,
        }
    }

    /// Attach the historical bar store.
    pub fn with_history(mut self, history: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(history);
        self
    }

    /// Fetch a quote, never failing.
    ///
    /// When every provider fails the result is a zeroed quote with
    /// `degraded = true` and `data_source = "none"`.
    pub async fn fetch_quote(&self, symbol: &Symbol, priority: Priority) -> Quote {
        match self.try_fetch_quote(symbol, priority).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("No provider produced a quote for {}: {}", symbol, e);
                Quote::unavailable(symbol.clone(), Utc::now())
            }
        }
    }

    /// Fetch a quote, reporting why the chain was exhausted.
    pub async fn try_fetch_quote(
        &self,
        symbol: &Symbol,
        priority: Priority,
    ) -> Result<Quote, MarketDataError> {
        let (result, diagnostics) = self.fetch_quote_with_diagnostics(symbol, priority).await;
        debug!("Quote fetch for {} [{}]: {}", symbol, priority, diagnostics.summary());
        result
    }

    /// Walk the fallback chain and record every attempt.
    ///
    /// Tries providers in order:
    /// 1. Skip providers whose circuit is open
    /// 2. Call the provider under its own timeout
    /// 3. Normalize and validate the payload
    /// 4. On success, close the circuit. On failure (including a payload that
    ///    fails validation), penalise it if the error class asks for it and
    ///    move on
    pub async fn fetch_quote_with_diagnostics(
        &self,
        symbol: &Symbol,
        priority: Priority,
    ) -> (Result<Quote, MarketDataError>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();

        if self.providers.is_empty() {
            warn!("No quote providers configured");
            return (Err(MarketDataError::NoProvidersAvailable), diagnostics);
        }

        let mut last_error: Option<MarketDataError> = None;
        let mut all_not_found = true;

        for provider in &self.providers {
            let provider_id: ProviderId = Cow::Owned(provider.id().to_string());

            if !self.circuit_breaker.is_allowed(provider.id()) {
                debug!(
                    "Circuit breaker open for provider '{}', skipping",
                    provider_id
                );
                diagnostics.record_skip(provider_id, SkipReason::CircuitBreakerOpen);
                continue;
            }

            let started = Instant::now();
            let attempt =
                tokio::time::timeout(provider.timeout(), provider.get_quote(symbol, priority))
                    .await
                    .unwrap_or_else(|_| {
                        Err(MarketDataError::Timeout {
                            provider: provider.id().to_string(),
                        })
                    });
            let latency_ms = started.elapsed().as_millis() as u64;

            let outcome = attempt.and_then(|raw| {
                let quote = raw.normalize(symbol.clone(), provider.id(), latency_ms, Utc::now());
                self.validator.validate(&quote).map(|()| quote)
            });

            match outcome {
                Ok(quote) => {
                    self.circuit_breaker.record_success(provider.id());
                    diagnostics.record_success(provider_id, latency_ms);
                    return (Ok(quote), diagnostics);
                }
                Err(e) => {
                    diagnostics.record_failure(provider_id.clone(), &e, latency_ms);
                    all_not_found &= matches!(e, MarketDataError::SymbolNotFound(_));

                    match e.retry_class() {
                        RetryClass::Never => {
                            info!(
                                "Terminal error from '{}' for {}: {}, not trying other providers",
                                provider_id, symbol, e
                            );
                            return (Err(e), diagnostics);
                        }
                        RetryClass::FailoverWithPenalty => {
                            self.circuit_breaker.record_failure(provider.id());
                            warn!(
                                "Provider '{}' failed for {} with {}, recorded circuit breaker failure",
                                provider_id, symbol, e
                            );
                        }
                        RetryClass::NextProvider | RetryClass::CircuitOpen => {
                            info!(
                                "Provider '{}' failed for {} with {}, trying next provider",
                                provider_id, symbol, e
                            );
                        }
                    }

                    last_error = Some(e);
                }
            }
        }

        let error = match last_error {
            None => MarketDataError::AllProvidersFailed,
            Some(_) if all_not_found => MarketDataError::SymbolNotFound(symbol.to_string()),
            Some(e) => e,
        };
        (Err(error), diagnostics)
    }

    /// Fetch historical bars from the bar store.
    pub async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let history = self
            .history
            .as_ref()
            .ok_or(MarketDataError::NoProvidersAvailable)?;

        let bars = history.get_bars(symbol, start, end).await?;
        debug!(
            "Fetched {} bars for {} from '{}'",
            bars.len(),
            symbol,
            history.id()
        );
        Ok(bars)
    }

    /// Registered providers in fallback order.
    pub fn providers(&self) -> &[Arc<dyn QuoteProvider>] {
        &self.providers
    }

    pub fn is_circuit_open(&self, provider_id: &str) -> bool {
        !self.circuit_breaker.is_allowed(provider_id)
    }

    pub fn reset_circuit(&self, provider_id: &str) {
        self.circuit_breaker.reset(provider_id);
    }
}
