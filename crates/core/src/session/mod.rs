//! Market session clock.
//!
//! Classifies instants into [`SessionState`]s for a reference exchange
//! calendar and publishes changes through a `watch` channel:
//!
//! - **Model** (`session_model.rs`) - `SessionState`
//! - **Calendar** (`calendar.rs`) - Trading days, holidays, session hours
//! - **Monitor** (`monitor.rs`) - Background poller feeding the scheduler

mod calendar;
mod monitor;
mod session_model;

pub use calendar::{MarketCalendar, SessionTimes};
pub use monitor::SessionMonitor;
pub use session_model::SessionState;
