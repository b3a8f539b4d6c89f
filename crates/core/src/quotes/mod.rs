//! Quote access for the scheduler.
//!
//! - [`traits`] - `QuoteSource`, the seam the scheduler fetches through
//! - [`client`] - Market data client facade for the market-data crate
//!
//! # Architecture
//!
//! ```text
//! RefreshScheduler → QuoteSource (MarketDataClient) → ProviderRegistry
//!                                                      ↓
//!                                           HTTP quote providers / bar store
//! ```

pub mod client;
pub mod traits;

pub use client::{price_as_f64, MarketDataClient, ProviderConfig};
pub use traits::QuoteSource;
