//! Refresh scheduler / staleness cache.
//!
//! Owns one [`CacheEntry`] per (symbol, priority) key. Each subscribed key
//! runs a timer task that refreshes on the interval for the current session;
//! every refresh trigger goes through [`SchedulerInner::trigger`], which
//! attaches to an in-flight fetch when there is one.
//!
//! ```text
//! subscribe ──▶ CacheEntry ──▶ timer ──▶ trigger ──▶ QuoteSource
//!                   ▲                       │
//!                   └──── publish ◀─────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use futures::FutureExt;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::entry::{CacheEntry, InFlight, InFlightGuard};
use super::{
    CacheKey, FeedUpdate, MarketSnapshot, SchedulerConfig, SchedulerStats, Subscription,
};
use crate::errors::{FeedError, Result};
use crate::factors::generate_factors;
use crate::indicators::IndicatorSet;
use crate::quotes::{price_as_f64, QuoteSource};
use crate::session::SessionState;
use marketpulse_market_data::{PriceBar, Priority, Quote, Symbol};

/// Handle to the scheduler. Cheap to clone.
#[derive(Clone)]
pub struct RefreshScheduler {
    inner: Arc<SchedulerInner>,
}

pub(crate) struct SchedulerInner {
    source: Arc<dyn QuoteSource>,
    session: watch::Receiver<SessionState>,
    config: SchedulerConfig,
    entries: DashMap<CacheKey, Arc<CacheEntry>>,
    next_subscription_id: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        session: watch::Receiver<SessionState>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                source,
                session,
                config,
                entries: DashMap::new(),
                next_subscription_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register interest in a key.
    ///
    /// Creates the entry on first use and triggers an immediate fetch when
    /// there is no value yet or the value is older than its TTL. Must be
    /// called within a Tokio runtime.
    pub fn subscribe(&self, symbol: Symbol, priority: Priority) -> Subscription {
        self.inner.subscribe(CacheKey::new(symbol, priority))
    }

    /// Latest quote for a key, flagged degraded when stale.
    pub fn get(
        &self,
        symbol: &Symbol,
        priority: Priority,
    ) -> std::result::Result<Quote, FeedError> {
        self.snapshot(symbol, priority)
            .map(|snapshot| snapshot.quote.clone())
    }

    /// Latest full snapshot for a key, flagged degraded when stale.
    pub fn snapshot(&self, symbol: &Symbol, priority: Priority) -> FeedUpdate {
        let key = CacheKey::new(symbol.clone(), priority);
        let entry = self.inner.entry(&key).ok_or_else(|| FeedError::NotTracked {
            symbol: symbol.to_string(),
        })?;
        entry.view(Instant::now(), self.inner.staleness(priority))
    }

    /// Refresh a tracked key now, attaching to any in-flight fetch.
    pub async fn refresh(&self, symbol: &Symbol, priority: Priority) -> FeedUpdate {
        let key = CacheKey::new(symbol.clone(), priority);
        match self.inner.entry(&key) {
            Some(entry) => self.inner.trigger(&entry).await,
            None => Err(FeedError::NotTracked {
                symbol: symbol.to_string(),
            }),
        }
    }

    pub fn current_session(&self) -> SessionState {
        *self.inner.session.borrow()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner
            .entries
            .iter()
            .fold(SchedulerStats::default(), |mut stats, entry| {
                stats.entries += 1;
                stats.subscribers += entry.subscriber_count();
                stats.in_flight += usize::from(entry.is_in_flight());
                stats
            })
    }

    /// Stop every timer and pending eviction. In-flight fetches still finish.
    pub fn shutdown(&self) {
        for entry in self.inner.entries.iter() {
            entry.abort_tasks();
        }
        info!(
            "Refresh scheduler shut down ({} entries)",
            self.inner.entries.len()
        );
    }
}

impl SchedulerInner {
    fn entry(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn session(&self) -> SessionState {
        *self.session.borrow()
    }

    fn interval(&self, priority: Priority) -> std::time::Duration {
        self.config.interval(self.session(), priority)
    }

    fn staleness(&self, priority: Priority) -> std::time::Duration {
        self.config.staleness(self.session(), priority)
    }

    fn subscribe(self: &Arc<Self>, key: CacheKey) -> Subscription {
        // Shard lock orders this against eviction. The lifecycle lock orders
        // it against a concurrent release of the same entry.
        let (entry, previous) = {
            let slot = self.entries.entry(key.clone()).or_insert_with(|| {
                debug!("Creating cache entry for {}", key);
                Arc::new(CacheEntry::new(key.clone(), self.config.channel_capacity))
            });
            let entry = slot.value().clone();
            let mut lifecycle = entry.lifecycle();
            let previous = lifecycle.add_subscriber();
            lifecycle.cancel_eviction();
            if !lifecycle.has_live_timer() {
                lifecycle.set_timer(self.spawn_timer(&entry));
            }
            drop(lifecycle);
            (entry, previous)
        };

        let now = Instant::now();
        let (receiver, initial) = entry.attach(now, self.staleness(key.priority));
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Subscription {} to {} ({} subscribers)",
            id,
            key,
            previous + 1
        );

        if entry.needs_refresh(now, self.interval(key.priority)) {
            drop(self.trigger(&entry));
        }

        Subscription::new(id, entry, Arc::downgrade(self), receiver, initial)
    }

    pub(crate) fn release(self: &Arc<Self>, entry: &Arc<CacheEntry>) {
        let key = entry.key.clone();
        let grace = self.config.grace_period;

        let mut lifecycle = entry.lifecycle();
        if lifecycle.remove_subscriber() > 0 {
            return;
        }
        lifecycle.abort_timer();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // evict takes the shard lock, which must not nest inside this one.
            drop(lifecycle);
            self.evict(&key);
            return;
        };

        debug!("Last subscriber left {}, evicting in {:?}", key, grace);
        let scheduler = Arc::downgrade(self);
        lifecycle.set_eviction(runtime.spawn(async move {
            tokio::time::sleep(grace).await;
            if let Some(scheduler) = scheduler.upgrade() {
                scheduler.evict(&key);
            }
        }));
    }

    fn evict(&self, key: &CacheKey) {
        if self
            .entries
            .remove_if(key, |_, entry| entry.subscriber_count() == 0)
            .is_some()
        {
            debug!("Evicted cache entry {}", key);
        }
    }

    fn spawn_timer(self: &Arc<Self>, entry: &Arc<CacheEntry>) -> JoinHandle<()> {
        let scheduler = Arc::downgrade(self);
        let task_entry = entry.clone();
        let mut session = self.session.clone();

        tokio::spawn(async move {
            let entry = task_entry;
            let mut watching_session = true;
            loop {
                let Some(inner) = scheduler.upgrade() else {
                    break;
                };
                let state = *session.borrow_and_update();
                let due = entry.next_due(inner.config.interval(state, entry.key.priority));
                drop(inner);

                tokio::select! {
                    _ = tokio::time::sleep_until(due) => {}
                    changed = session.changed(), if watching_session => {
                        if changed.is_err() {
                            watching_session = false;
                        } else {
                            debug!("Session change woke timer for {}", entry.key);
                        }
                        continue;
                    }
                }

                let Some(inner) = scheduler.upgrade() else {
                    break;
                };
                let _ = inner.trigger(&entry).await;
            }
        })
    }

    /// Start a fetch for the entry, or attach to the one already running.
    pub(crate) fn trigger(self: &Arc<Self>, entry: &Arc<CacheEntry>) -> InFlight {
        let mut slot = entry.lock_in_flight();
        if let Some(in_flight) = slot.as_ref() {
            debug!("Coalescing refresh of {} into in-flight fetch", entry.key);
            return in_flight.clone();
        }

        let scheduler = self.clone();
        let task_entry = entry.clone();
        let handle = tokio::spawn(async move {
            let _guard = InFlightGuard(&task_entry);
            scheduler.refresh_entry(&task_entry).await
        });

        let symbol = entry.key.symbol.to_string();
        let in_flight = async move {
            handle.await.unwrap_or_else(|e| {
                warn!("Refresh task for {} ended abnormally: {}", symbol, e);
                Err(FeedError::SourceUnavailable { symbol })
            })
        }
        .boxed()
        .shared();

        *slot = Some(in_flight.clone());
        in_flight
    }

    async fn refresh_entry(&self, entry: &CacheEntry) -> FeedUpdate {
        let key = &entry.key;

        match self.fetch_with_retry(key).await {
            Ok(quote) => {
                let bars = self.refresh_history(entry).await;
                let indicators = IndicatorSet::from_bars(&bars);
                let factors = generate_factors(price_as_f64(quote.price), &indicators);
                debug!(
                    "Refreshed {} from {} in {}ms ({} bars, {} factors)",
                    key,
                    quote.data_source,
                    quote.latency_ms,
                    bars.len(),
                    factors.len()
                );

                let snapshot = Arc::new(MarketSnapshot {
                    quote,
                    indicators,
                    factors,
                });
                let now = Instant::now();
                let published = snapshot.clone();
                entry.publish(Ok(published), move |state| {
                    state.snapshot = Some(snapshot);
                    state.last_fetch_at = Some(now);
                    state.last_attempt_at = Some(now);
                })
            }
            Err(e) => {
                let update = match entry.last_snapshot() {
                    Some(previous) => {
                        warn!(
                            "Refresh of {} failed ({}), serving last value degraded",
                            key, e
                        );
                        Ok(Arc::new(previous.degraded()))
                    }
                    None if e.is_symbol_error() => {
                        warn!("Refresh of {} rejected: {}", key, e);
                        Err(FeedError::InvalidSymbol {
                            symbol: key.symbol.to_string(),
                        })
                    }
                    None => {
                        warn!("Refresh of {} failed ({}), no value to serve", key, e);
                        Err(FeedError::SourceUnavailable {
                            symbol: key.symbol.to_string(),
                        })
                    }
                };
                let now = Instant::now();
                entry.publish(update, move |state| state.last_attempt_at = Some(now))
            }
        }
    }

    /// One attempt plus up to `max_retries` retries with fixed backoff.
    /// Symbol errors are not retried.
    async fn fetch_with_retry(&self, key: &CacheKey) -> Result<Quote> {
        let mut retries = 0;
        loop {
            match self.source.fetch_quote(&key.symbol, key.priority).await {
                Ok(quote) => return Ok(quote),
                Err(e) if e.is_symbol_error() => return Err(e),
                Err(e) if retries < self.config.max_retries => {
                    retries += 1;
                    debug!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        key, e, retries, self.config.max_retries, self.config.retry_backoff
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Bars for indicator computation, refetched at most every `history_refresh`.
    /// A failed fetch keeps the previous bars.
    async fn refresh_history(&self, entry: &CacheEntry) -> Arc<Vec<PriceBar>> {
        let now = Instant::now();
        let (bars, due) = {
            let state = entry.read_state();
            let due = state.history_attempt_at.map_or(true, |at| {
                now.saturating_duration_since(at) >= self.config.history_refresh
            });
            (state.bars.clone(), due)
        };
        if !due {
            return bars;
        }

        let end = Utc::now();
        let start = end - chrono::Duration::days(self.config.history_lookback_days);
        let bars = match self.source.fetch_history(&entry.key.symbol, start, end).await {
            Ok(fetched) => {
                debug!("Loaded {} bars for {}", fetched.len(), entry.key.symbol);
                Arc::new(fetched)
            }
            Err(e) => {
                warn!(
                    "History fetch for {} failed ({}), keeping {} cached bars",
                    entry.key.symbol,
                    e,
                    bars.len()
                );
                bars
            }
        };

        let cached = bars.clone();
        entry.update_state(move |state| {
            state.bars = cached;
            state.history_attempt_at = Some(now);
        });
        bars
    }
}
