//! Quote data validation.
//!
//! Normalized candidates are checked before the registry accepts them:
//! - Hard failures (rejected, next provider is tried): non-positive price,
//!   negative volume, high below low
//! - Soft warnings (logged only): price outside the day's high/low, zero
//!   volume
//!
//! OHLC fields of zero mean "not supplied" and are skipped.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Reject quote, try next provider.
    Hard,
    /// Accept quote but log warning.
    Soft,
}

#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Quote validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Sanity ceiling for prices; exceeding it is a soft warning.
    pub max_price: Option<Decimal>,
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_price: Some(Decimal::from(1_000_000_000i64)),
            warn_on_zero_volume: false,
        }
    }
}

pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl Default for QuoteValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteValidator {
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a normalized quote.
    ///
    /// Returns `ValidationFailed` listing every hard issue. Soft issues are
    /// logged.
    pub fn validate(&self, quote: &Quote) -> Result<(), MarketDataError> {
        let issues = self.issues(quote);

        let hard: Vec<&str> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !hard.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: hard.join("; "),
            });
        }

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!(
                "Quote validation warning for {} from {}: {}",
                quote.symbol, quote.data_source, issue.message
            );
        }

        Ok(())
    }

    /// Collect all issues for a quote.
    pub fn issues(&self, quote: &Quote) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut push = |severity, message: String| issues.push(ValidationIssue { severity, message });

        if quote.price <= Decimal::ZERO {
            push(
                ValidationSeverity::Hard,
                format!("Non-positive price: {}", quote.price),
            );
        }

        if quote.volume < Decimal::ZERO {
            push(
                ValidationSeverity::Hard,
                format!("Negative volume: {}", quote.volume),
            );
        } else if self.config.warn_on_zero_volume && quote.volume == Decimal::ZERO {
            push(ValidationSeverity::Soft, "Zero volume".to_string());
        }

        for (name, value) in [
            ("open", quote.open),
            ("high", quote.high),
            ("low", quote.low),
            ("previous close", quote.previous_close),
        ] {
            if value < Decimal::ZERO {
                push(
                    ValidationSeverity::Hard,
                    format!("Negative {} price: {}", name, value),
                );
            }
        }

        let has_range = quote.high > Decimal::ZERO && quote.low > Decimal::ZERO;
        if has_range && quote.high < quote.low {
            push(
                ValidationSeverity::Hard,
                format!("High ({}) is less than Low ({})", quote.high, quote.low),
            );
        } else if has_range && (quote.price < quote.low || quote.price > quote.high) {
            push(
                ValidationSeverity::Soft,
                format!(
                    "Price ({}) is outside High/Low range ({}-{})",
                    quote.price, quote.low, quote.high
                ),
            );
        }

        if let Some(max) = self.config.max_price {
            if quote.price > max {
                push(
                    ValidationSeverity::Soft,
                    format!("Price ({}) exceeds max threshold ({})", quote.price, max),
                );
            }
        }

        issues
    }
}
