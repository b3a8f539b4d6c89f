//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` and `HistoryProvider` traits
//! - HTTP implementations talking to the upstream quote services and the
//!   historical bar store
//!
//! Providers only fetch and decode. Ordering, fallback, timeouts and
//! normalization happen in the registry.

mod traits;

pub mod http;

pub use http::{HttpHistoryProvider, HttpProviderConfig, HttpQuoteProvider};
pub use traits::{HistoryProvider, QuoteProvider, DEFAULT_ATTEMPT_TIMEOUT};
