//! Per-key cache entry.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use log::warn;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{CacheKey, FeedUpdate, MarketSnapshot};
use crate::errors::FeedError;
use marketpulse_market_data::PriceBar;

/// A fetch every caller for the key attaches to.
pub(crate) type InFlight = Shared<BoxFuture<'static, FeedUpdate>>;

#[derive(Default)]
pub(crate) struct EntryState {
    /// Last successful snapshot.
    pub snapshot: Option<Arc<MarketSnapshot>>,
    /// Completion of the last successful fetch. Ages are measured from here.
    pub last_fetch_at: Option<Instant>,
    /// Completion of the last fetch, successful or not. Timers schedule from here.
    pub last_attempt_at: Option<Instant>,
    /// Most recently published outcome.
    pub last_outcome: Option<FeedUpdate>,
    pub bars: Arc<Vec<PriceBar>>,
    pub history_attempt_at: Option<Instant>,
}

pub(crate) struct CacheEntry {
    pub key: CacheKey,
    state: RwLock<EntryState>,
    in_flight: Mutex<Option<InFlight>>,
    updates: broadcast::Sender<FeedUpdate>,
    lifecycle: Mutex<Lifecycle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, key: &CacheKey) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Cache entry mutex for {} was poisoned, recovering", key);
        poisoned.into_inner()
    })
}

impl CacheEntry {
    pub fn new(key: CacheKey, capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(capacity.max(1));
        Self {
            key,
            state: RwLock::new(EntryState::default()),
            in_flight: Mutex::new(None),
            updates,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn read_state(&self) -> RwLockReadGuard<'_, EntryState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Cache entry state for {} was poisoned, recovering", self.key);
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, EntryState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Cache entry state for {} was poisoned, recovering", self.key);
            poisoned.into_inner()
        })
    }

    pub fn update_state(&self, apply: impl FnOnce(&mut EntryState)) {
        apply(&mut self.write_state());
    }

    /// Replace the published outcome and broadcast it.
    ///
    /// The state write and the send happen under one lock so a concurrent
    /// [`attach`](Self::attach) sees either the old outcome plus this send, or
    /// the new outcome and no send.
    pub fn publish(
        &self,
        update: FeedUpdate,
        apply: impl FnOnce(&mut EntryState),
    ) -> FeedUpdate {
        let mut state = self.write_state();
        apply(&mut state);
        state.last_outcome = Some(update.clone());
        // No receivers is fine: the outcome is kept for `get`.
        let _ = self.updates.send(update.clone());
        update
    }

    /// Subscribe to updates and read the current value atomically.
    pub fn attach(
        &self,
        now: Instant,
        staleness: Duration,
    ) -> (broadcast::Receiver<FeedUpdate>, Option<FeedUpdate>) {
        let state = self.read_state();
        let receiver = self.updates.subscribe();
        let current = state
            .last_outcome
            .as_ref()
            .map(|_| Self::view_locked(&state, &self.key, now, staleness));
        (receiver, current)
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<FeedUpdate> {
        self.updates.subscribe()
    }

    /// Current value, flagged degraded once older than `staleness`.
    pub fn view(&self, now: Instant, staleness: Duration) -> FeedUpdate {
        Self::view_locked(&self.read_state(), &self.key, now, staleness)
    }

    fn view_locked(
        state: &EntryState,
        key: &CacheKey,
        now: Instant,
        staleness: Duration,
    ) -> FeedUpdate {
        match &state.last_outcome {
            None => Err(FeedError::Pending {
                symbol: key.symbol.to_string(),
            }),
            Some(Err(e)) => Err(e.clone()),
            Some(Ok(snapshot)) => {
                let stale = state
                    .last_fetch_at
                    .map_or(true, |at| now.saturating_duration_since(at) > staleness);
                if stale && !snapshot.quote.degraded {
                    Ok(Arc::new(snapshot.degraded()))
                } else {
                    Ok(snapshot.clone())
                }
            }
        }
    }

    pub fn last_snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.read_state().snapshot.clone()
    }

    /// A refresh is due when nothing was fetched yet or the value outlived `ttl`.
    pub fn needs_refresh(&self, now: Instant, ttl: Duration) -> bool {
        self.read_state()
            .last_fetch_at
            .map_or(true, |at| now.saturating_duration_since(at) >= ttl)
    }

    /// When the timer should fire next.
    pub fn next_due(&self, interval: Duration) -> Instant {
        match self.read_state().last_attempt_at {
            Some(at) => at + interval,
            None => Instant::now(),
        }
    }

    // =========================================================================
    // In-flight fetch
    // =========================================================================

    pub fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        lock(&self.in_flight, &self.key)
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock_in_flight().is_some()
    }

    // =========================================================================
    // Subscribers and tasks
    // =========================================================================

    /// Subscriber count, timer and eviction task, changed together.
    pub fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        lock(&self.lifecycle, &self.key)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lifecycle().subscribers
    }

    #[cfg(test)]
    pub fn has_live_timer(&self) -> bool {
        self.lifecycle().has_live_timer()
    }

    pub fn abort_tasks(&self) {
        let mut lifecycle = self.lifecycle();
        lifecycle.abort_timer();
        lifecycle.cancel_eviction();
    }
}

#[derive(Default)]
pub(crate) struct Lifecycle {
    subscribers: usize,
    timer: Option<JoinHandle<()>>,
    eviction: Option<JoinHandle<()>>,
}

impl Lifecycle {
    /// Returns the count before this subscriber.
    pub fn add_subscriber(&mut self) -> usize {
        let previous = self.subscribers;
        self.subscribers += 1;
        previous
    }

    /// Returns the count after removal.
    pub fn remove_subscriber(&mut self) -> usize {
        self.subscribers = self.subscribers.saturating_sub(1);
        self.subscribers
    }

    pub fn has_live_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.timer.replace(handle) {
            previous.abort();
        }
    }

    pub fn abort_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    pub fn set_eviction(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.eviction.replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel_eviction(&mut self) {
        if let Some(handle) = self.eviction.take() {
            handle.abort();
        }
    }
}

/// Clears the in-flight slot when the fetch task ends, even by panic.
pub(crate) struct InFlightGuard<'a>(pub &'a CacheEntry);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.lock_in_flight().take();
    }
}
