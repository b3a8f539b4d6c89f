//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `symbol` - Validated ticker symbol (Symbol)
//! - `priority` - Consumer priority tier (Priority)
//! - `quote` - Normalized quote and raw provider payload (Quote, ProviderQuote)
//! - `bar` - Historical OHLCV bar (PriceBar)

mod bar;
mod priority;
mod quote;
mod symbol;
mod types;

pub use bar::{closes, PriceBar};
pub use priority::Priority;
pub use quote::{ProviderQuote, Quote};
pub use symbol::Symbol;
pub use types::{ProviderId, DATA_SOURCE_NONE};
