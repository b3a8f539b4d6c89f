//! Refresh scheduler and consumer API.
//!
//! - **Config** (`config.rs`) - Interval and staleness tables, retry policy
//! - **Snapshot** (`snapshot.rs`) - `MarketSnapshot`, `FeedUpdate`, `CacheKey`
//! - **Entry** (`entry.rs`) - Per-key cache entry
//! - **Service** (`service.rs`) - `RefreshScheduler`
//! - **Subscription** (`subscription.rs`) - Consumer handle, callbacks and streams
//!
//! # Guarantees
//!
//! - At most one upstream fetch in flight per key; concurrent triggers
//!   attach to it and observe the same outcome
//! - Updates per key are delivered in fetch-completion order
//! - Consumers receive either a fully populated snapshot or a [`FeedError`]
//!
//! [`FeedError`]: crate::errors::FeedError

mod config;
mod entry;
mod service;
mod snapshot;
mod subscription;

#[cfg(test)]
mod service_tests;

pub use config::{RefreshTable, SchedulerConfig, TierDurations};
pub use service::RefreshScheduler;
pub use snapshot::{CacheKey, FeedUpdate, MarketSnapshot, SchedulerStats};
pub use subscription::Subscription;
