//! Exchange calendar and the session classifier.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::SessionState;
use crate::errors::{Error, Result};

/// Session boundaries for a single trading day, in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimes {
    pub pre_market_open: NaiveTime,
    pub regular_open: NaiveTime,
    pub regular_close: NaiveTime,
    pub post_market_close: NaiveTime,
}

/// Static weekday/holiday/open-hours table for one exchange.
///
/// Loaded once at startup; classification does no I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCalendar {
    pub name: String,
    pub timezone: Tz,
    pub pre_market_open: NaiveTime,
    pub regular_open: NaiveTime,
    pub regular_close: NaiveTime,
    pub post_market_close: NaiveTime,
    pub trading_days: Vec<Weekday>,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub early_closes: BTreeSet<NaiveDate>,
    /// Regular close on early-close days.
    pub early_close: NaiveTime,
    /// Extended-hours end on early-close days.
    pub early_post_market_close: NaiveTime,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn dates(days: &[(i32, u32, u32)]) -> BTreeSet<NaiveDate> {
    days.iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

impl MarketCalendar {
    /// New York Stock Exchange hours with the 2025 and 2026 holiday tables.
    pub fn nyse() -> Self {
        Self {
            name: "NYSE".to_string(),
            timezone: chrono_tz::America::New_York,
            pre_market_open: hm(4, 0),
            regular_open: hm(9, 30),
            regular_close: hm(16, 0),
            post_market_close: hm(20, 0),
            trading_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: dates(&[
                (2025, 1, 1),
                (2025, 1, 9),
                (2025, 1, 20),
                (2025, 2, 17),
                (2025, 4, 18),
                (2025, 5, 26),
                (2025, 6, 19),
                (2025, 7, 4),
                (2025, 9, 1),
                (2025, 11, 27),
                (2025, 12, 25),
                (2026, 1, 1),
                (2026, 1, 19),
                (2026, 2, 16),
                (2026, 4, 3),
                (2026, 5, 25),
                (2026, 6, 19),
                (2026, 7, 3),
                (2026, 9, 7),
                (2026, 11, 26),
                (2026, 12, 25),
            ]),
            early_closes: dates(&[
                (2025, 7, 3),
                (2025, 11, 28),
                (2025, 12, 24),
                (2026, 11, 27),
                (2026, 12, 24),
            ]),
            early_close: hm(13, 0),
            early_post_market_close: hm(17, 0),
        }
    }

    /// Parse and validate a calendar from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let calendar: MarketCalendar = serde_json::from_str(json)?;
        calendar.validate()?;
        Ok(calendar)
    }

    /// Load a calendar from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigIO(format!("Cannot read calendar {}: {}", path.display(), e))
        })?;
        let calendar = Self::from_json(&json)?;
        log::info!(
            "Loaded {} calendar from {} ({} holidays, {} early closes)",
            calendar.name,
            path.display(),
            calendar.holidays.len(),
            calendar.early_closes.len()
        );
        Ok(calendar)
    }

    /// Check that session boundaries are ordered.
    pub fn validate(&self) -> Result<()> {
        let ordered = |t: SessionTimes| {
            t.pre_market_open <= t.regular_open
                && t.regular_open < t.regular_close
                && t.regular_close <= t.post_market_close
        };

        if !ordered(self.regular_times()) {
            return Err(Error::Calendar(format!(
                "{}: session times out of order",
                self.name
            )));
        }
        if !ordered(self.early_close_times()) {
            return Err(Error::Calendar(format!(
                "{}: early-close times out of order",
                self.name
            )));
        }
        if self.trading_days.is_empty() {
            return Err(Error::Calendar(format!("{}: no trading days", self.name)));
        }
        Ok(())
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.trading_days.contains(&date.weekday()) && !self.holidays.contains(&date)
    }

    /// Session boundaries for `date`, or `None` when the market does not open.
    pub fn session_times(&self, date: NaiveDate) -> Option<SessionTimes> {
        if !self.is_trading_day(date) {
            return None;
        }
        if self.early_closes.contains(&date) {
            Some(self.early_close_times())
        } else {
            Some(self.regular_times())
        }
    }

    /// Classify an instant.
    pub fn current_session(&self, now: DateTime<Utc>) -> SessionState {
        let local = now.with_timezone(&self.timezone);

        let Some(times) = self.session_times(local.date_naive()) else {
            return SessionState::Closed;
        };

        let t = local.time();
        if t >= times.regular_open && t < times.regular_close {
            SessionState::Live
        } else if (t >= times.pre_market_open && t < times.regular_open)
            || (t >= times.regular_close && t < times.post_market_close)
        {
            SessionState::Extended
        } else {
            SessionState::Closed
        }
    }

    fn regular_times(&self) -> SessionTimes {
        SessionTimes {
            pre_market_open: self.pre_market_open,
            regular_open: self.regular_open,
            regular_close: self.regular_close,
            post_market_close: self.post_market_close,
        }
    }

    fn early_close_times(&self) -> SessionTimes {
        SessionTimes {
            pre_market_open: self.pre_market_open,
            regular_open: self.regular_open,
            regular_close: self.early_close,
            post_market_close: self.early_post_market_close,
        }
    }
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::nyse()
    }
}
