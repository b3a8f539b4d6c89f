/// Classification for retry policy.
///
/// Used to determine how the registry and scheduler respond to errors from
/// providers.
///
/// | Class | Try Next Provider? | Record Circuit Breaker Failure? | Scheduler retries? |
/// |-------|-------------------|--------------------------------|--------------------|
/// | `Never` | No | No | No |
/// | `FailoverWithPenalty` | Yes | Yes | Yes |
/// | `NextProvider` | Yes | No | Yes |
/// | `CircuitOpen` | Yes (skip this one) | No (already recorded) | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol or terminal failure.
    Never,

    /// Failover to next provider and record a circuit breaker penalty.
    ///
    /// Used for throttling (429), timeouts and payloads that fail validation.
    /// After enough failures the
    /// circuit opens and the provider is temporarily excluded.
    FailoverWithPenalty,

    /// Try next provider without recording any penalty.
    NextProvider,

    /// Circuit breaker is open for this provider.
    CircuitOpen,
}

impl RetryClass {
    /// Whether a later attempt for the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Never)
    }
}
