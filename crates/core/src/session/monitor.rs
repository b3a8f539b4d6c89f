//! Background session poller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{MarketCalendar, SessionState};
use crate::constants::SESSION_POLL_INTERVAL;

/// Re-evaluates the session on a fixed slow interval and publishes changes.
///
/// The scheduler only ever reads the latest value from the channel, so the
/// calendar is never consulted on the refresh path.
pub struct SessionMonitor {
    receiver: watch::Receiver<SessionState>,
    handle: JoinHandle<()>,
}

impl SessionMonitor {
    /// Start monitoring with the wall clock and the default poll interval.
    pub fn spawn(calendar: Arc<MarketCalendar>) -> Self {
        Self::spawn_with_clock(calendar, SESSION_POLL_INTERVAL, Utc::now)
    }

    /// Start monitoring with an injected clock.
    pub fn spawn_with_clock<C>(
        calendar: Arc<MarketCalendar>,
        poll_interval: Duration,
        clock: C,
    ) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        let initial = calendar.current_session(clock());
        info!("{} session is {}", calendar.name, initial);

        let (sender, receiver) = watch::channel(initial);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let next = calendar.current_session(clock());
                let changed = sender.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    info!("{} session changed: {} -> {}", calendar.name, current, next);
                    *current = next;
                    true
                });
                if !changed {
                    debug!("{} session unchanged ({})", calendar.name, next);
                }
            }
        });

        Self { receiver, handle }
    }

    /// A receiver observing every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }

    pub fn current(&self) -> SessionState {
        *self.receiver.borrow()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
