//! MarketPulse Market Data Crate
//!
//! This crate fetches and reconciles real-time quotes and historical bars
//! from ordered upstream providers.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple quote providers tried in priority order (primary, secondary, legacy)
//! - Per-attempt timeouts and circuit breaking
//! - Normalization of provider payloads into a single quote shape
//! - Validation of provider payloads before they reach consumers
//! - Historical daily bars from a bar store
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Scheduler      | --> |     Symbol       |  (validated ticker)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderRegistry |  (ordered fallback)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  QuoteProvider   |  (HTTP upstreams)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |     Quote        |  (normalized, validated)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Symbol`] - Validated, uppercase ticker symbol
//! - [`Priority`] - Consumer priority tier
//! - [`Quote`] - Normalized quote with OHLCV data and provenance
//! - [`ProviderQuote`] - Raw payload returned by a provider
//! - [`PriceBar`] - Historical daily bar

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{
    closes, PriceBar, Priority, ProviderId, ProviderQuote, Quote, Symbol, DATA_SOURCE_NONE,
};

// Re-export error types
pub use errors::{MarketDataError, RetryClass};

// Re-export provider types
pub use provider::{
    HistoryProvider, HttpHistoryProvider, HttpProviderConfig, HttpQuoteProvider, QuoteProvider,
    DEFAULT_ATTEMPT_TIMEOUT,
};

// Re-export registry types
pub use registry::{
    AttemptOutcome, CircuitBreaker, CircuitBreakerConfig, CircuitState, FetchDiagnostics, ProviderAttempt,
    ProviderRegistry, QuoteValidator, SkipReason, ValidationIssue, ValidationSeverity,
    ValidatorConfig,
};
