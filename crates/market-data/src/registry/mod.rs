//! Provider registry module.
//!
//! This module provides orchestration for quote providers, including:
//! - Priority ordering and fallback
//! - Circuit breaking for fault tolerance
//! - Quote data validation
//! - Attempt diagnostics

mod circuit_breaker;
mod diagnostics;
mod provider_registry;
mod validator;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use diagnostics::{AttemptOutcome, FetchDiagnostics, ProviderAttempt, SkipReason};
pub use provider_registry::ProviderRegistry;
pub use validator::{QuoteValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
