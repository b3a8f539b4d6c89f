use std::fmt;

use serde::{Deserialize, Serialize};

/// Trading state of the reference market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Regular trading hours.
    Live,
    /// Pre-market or after-hours trading.
    Extended,
    /// No trading: nights, weekends and holidays.
    #[default]
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Live => "LIVE",
            SessionState::Extended => "EXTENDED",
            SessionState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
