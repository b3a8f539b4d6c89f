//! Scheduler configuration.

use std::time::Duration;

use marketpulse_market_data::Priority;

use crate::constants::*;
use crate::session::SessionState;

/// A pair of durations, one per priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDurations {
    pub high: Duration,
    pub normal: Duration,
}

impl TierDurations {
    pub const fn new(high: Duration, normal: Duration) -> Self {
        Self { high, normal }
    }

    pub const fn uniform(value: Duration) -> Self {
        Self::new(value, value)
    }

    pub fn get(&self, priority: Priority) -> Duration {
        match priority {
            Priority::High => self.high,
            Priority::Normal => self.normal,
        }
    }
}

/// Durations keyed by (session, priority).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTable {
    pub live: TierDurations,
    pub extended: TierDurations,
    pub closed: TierDurations,
}

impl RefreshTable {
    pub fn get(&self, session: SessionState, priority: Priority) -> Duration {
        match session {
            SessionState::Live => self.live.get(priority),
            SessionState::Extended => self.extended.get(priority),
            SessionState::Closed => self.closed.get(priority),
        }
    }

    /// Polling intervals: LIVE 5 s / 15 s, EXTENDED 60 s, CLOSED 300 s.
    pub fn default_intervals() -> Self {
        Self {
            live: TierDurations::new(Duration::from_secs(5), Duration::from_secs(15)),
            extended: TierDurations::uniform(Duration::from_secs(60)),
            closed: TierDurations::uniform(Duration::from_secs(300)),
        }
    }

    /// Age at which a served value is flagged degraded.
    ///
    /// Twice the polling interval for high priority, four times for normal,
    /// so a single missed refresh never degrades a value.
    pub fn default_staleness() -> Self {
        Self {
            live: TierDurations::new(Duration::from_secs(10), Duration::from_secs(60)),
            extended: TierDurations::new(Duration::from_secs(120), Duration::from_secs(240)),
            closed: TierDurations::new(Duration::from_secs(600), Duration::from_secs(1200)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub intervals: RefreshTable,
    pub staleness: RefreshTable,
    /// Entry lifetime after the last unsubscribe.
    pub grace_period: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub history_lookback_days: i64,
    pub history_refresh: Duration,
    /// Per-key update buffer.
    pub channel_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            intervals: RefreshTable::default_intervals(),
            staleness: RefreshTable::default_staleness(),
            grace_period: DEFAULT_GRACE_PERIOD,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            history_lookback_days: DEFAULT_HISTORY_LOOKBACK_DAYS,
            history_refresh: DEFAULT_HISTORY_REFRESH,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Effective refresh interval (the entry's TTL).
    pub fn interval(&self, session: SessionState, priority: Priority) -> Duration {
        self.intervals.get(session, priority)
    }

    pub fn staleness(&self, session: SessionState, priority: Priority) -> Duration {
        self.staleness.get(session, priority)
    }
}
