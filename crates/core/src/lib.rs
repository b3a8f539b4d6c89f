//! MarketPulse Core - refresh scheduling, session clock, indicators and factors.
//!
//! This crate sits between the consumer API and the `market-data` crate.
//! It is transport-agnostic: quotes arrive through the [`QuoteSource`] trait
//! and leave through [`Subscription`]s or [`RefreshScheduler::get`].

pub mod constants;
pub mod errors;
pub mod factors;
pub mod indicators;
pub mod quotes;
pub mod scheduler;
pub mod session;

// Re-export the consumer-facing surface
pub use factors::{Factor, Fundamentals, HealthScore};
pub use indicators::IndicatorSet;
pub use quotes::{MarketDataClient, ProviderConfig, QuoteSource};
pub use scheduler::{FeedUpdate, MarketSnapshot, RefreshScheduler, SchedulerConfig, Subscription};
pub use session::{MarketCalendar, SessionMonitor, SessionState};

// Re-export error types
pub use errors::Error;
pub use errors::FeedError;
pub use errors::Result;
