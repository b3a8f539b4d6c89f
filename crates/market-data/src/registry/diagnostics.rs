//! Per-provider attempt log for one reconciliation.

use std::fmt;

use crate::errors::{MarketDataError, RetryClass};
use crate::models::ProviderId;

/// Why a provider was passed over without being called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    CircuitBreakerOpen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Skipped(SkipReason),
    Failed { error: String, class: RetryClass },
    Succeeded,
}

/// One provider considered during a fetch, in chain order.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: AttemptOutcome,
    /// Wall time of the call; zero for skips.
    pub latency_ms: u64,
}

impl ProviderAttempt {
    pub fn was_called(&self) -> bool {
        !matches!(self.outcome, AttemptOutcome::Skipped(_))
    }
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => write!(f, "{}: SKIPPED ({:?})", self.provider_id, reason),
            AttemptOutcome::Failed { error, .. } => {
                write!(f, "{}: ERROR ({}) in {}ms", self.provider_id, error, self.latency_ms)
            }
            AttemptOutcome::Succeeded => write!(f, "{}: OK in {}ms", self.provider_id, self.latency_ms),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, provider_id: ProviderId, outcome: AttemptOutcome, latency_ms: u64) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome,
            latency_ms,
        });
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.push(provider_id, AttemptOutcome::Skipped(reason), 0);
    }

    pub fn record_failure(&mut self, provider_id: ProviderId, error: &MarketDataError, latency_ms: u64) {
        let outcome = AttemptOutcome::Failed {
            error: error.to_string(),
            class: error.retry_class(),
        };
        self.push(provider_id, outcome, latency_ms);
    }

    pub fn record_success(&mut self, provider_id: ProviderId, latency_ms: u64) {
        self.push(provider_id, AttemptOutcome::Succeeded, latency_ms);
    }

    /// One line, chain order, e.g. `PRIMARY: SKIPPED (..) -> SECONDARY: OK in 80ms`.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no providers".to_string();
        }
        self.attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn succeeded_with(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Succeeded)
            .map(|a| a.provider_id.as_ref())
    }

    /// Providers actually called; skips excluded.
    pub fn calls(&self) -> usize {
        self.attempts.iter().filter(|a| a.was_called()).count()
    }

    /// Failures that counted against a provider's circuit breaker.
    pub fn penalised(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| {
                matches!(
                    a.outcome,
                    AttemptOutcome::Failed {
                        class: RetryClass::FailoverWithPenalty,
                        ..
                    }
                )
            })
            .count()
    }
}
