use std::time::Duration;

/// How often the session monitor re-evaluates the market session.
pub const SESSION_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// How long an unsubscribed cache entry survives before eviction.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Retries after the first failed refresh attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Fixed delay between refresh retries.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Calendar days of daily bars requested for indicator computation.
pub const DEFAULT_HISTORY_LOOKBACK_DAYS: i64 = 400;

/// Minimum age of cached bars before they are fetched again.
pub const DEFAULT_HISTORY_REFRESH: Duration = Duration::from_secs(15 * 60);

/// Buffered updates per key before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Maximum number of factors attached to a snapshot.
pub const MAX_FACTORS: usize = 6;
