//! Tests for RefreshScheduler contracts.
//!
//! All tests run on paused time, so intervals, retries and grace periods
//! elapse instantly and deterministically.
//!
//! # Contract Points
//!
//! 1. Coalescing: concurrent triggers for one key share one upstream fetch
//! 2. Scheduling: refresh interval follows (session, priority)
//! 3. Failure: retries, then degraded last value or a typed error
//! 4. Lifecycle: grace-period eviction, callbacks, streams, shutdown
//! 5. Concurrency: subscribe/unsubscribe churn across worker threads
//!
//! The concurrency tests run on a multi-threaded runtime with real time.

#[cfg(test)]
mod tests {
    use crate::errors::{FeedError, Result};
    use crate::quotes::QuoteSource;
    use crate::scheduler::{RefreshScheduler, RefreshTable, SchedulerConfig, TierDurations};
    use crate::session::SessionState;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use futures::StreamExt;
    use marketpulse_market_data::{
        MarketDataError, PriceBar, Priority, ProviderQuote, Quote, Symbol,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::Instant;

    // =========================================================================
    // Mock QuoteSource
    // =========================================================================

    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Succeed,
        Fail,
        UnknownSymbol,
    }

    struct MockSource {
        mode: Mutex<Mode>,
        price: Mutex<Decimal>,
        delay: Duration,
        fail_history: AtomicBool,
        quote_calls: AtomicUsize,
        history_calls: AtomicUsize,
    }

    impl MockSource {
        fn new() -> Arc<Self> {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                mode: Mutex::new(Mode::Succeed),
                price: Mutex::new(dec!(400)),
                delay,
                fail_history: AtomicBool::new(false),
                quote_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
            })
        }

        fn set_mode(&self, mode: Mode) {
            *self.mode.lock().unwrap() = mode;
        }

        fn set_price(&self, price: Decimal) {
            *self.price.lock().unwrap() = price;
        }

        fn quote_calls(&self) -> usize {
            self.quote_calls.load(Ordering::SeqCst)
        }

        fn history_calls(&self) -> usize {
            self.history_calls.load(Ordering::SeqCst)
        }
    }

    fn rising_bars(n: usize) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar {
                    timestamp: start + ChronoDuration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000.0,
                }
            })
            .collect()
    }

    #[async_trait]
    impl QuoteSource for MockSource {
        async fn fetch_quote(&self, symbol: &Symbol, _priority: Priority) -> Result<Quote> {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let mode = *self.mode.lock().unwrap();
            match mode {
                Mode::Succeed => {
                    let price = *self.price.lock().unwrap();
                    Ok(ProviderQuote {
                        price,
                        previous_close: Some(dec!(390)),
                        ..Default::default()
                    }
                    .normalize(symbol.clone(), "PRIMARY", 12, Utc::now()))
                }
                Mode::Fail => Err(MarketDataError::AllProvidersFailed.into()),
                Mode::UnknownSymbol => Err(MarketDataError::SymbolNotFound(symbol.to_string()).into()),
            }
        }

        async fn fetch_history(
            &self,
            _symbol: &Symbol,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<PriceBar>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_history.load(Ordering::SeqCst) {
                return Err(MarketDataError::Timeout {
                    provider: "BARS".to_string(),
                }
                .into());
            }
            Ok(rising_bars(250))
        }
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    /// Timer deadlines round to the millisecond, so allow a little slack.
    fn within(elapsed: Duration, secs: u64) -> bool {
        let expected = Duration::from_secs(secs);
        elapsed >= expected && elapsed < expected + Duration::from_millis(50)
    }

    fn scheduler_with(
        source: Arc<MockSource>,
        session: SessionState,
        config: SchedulerConfig,
    ) -> (RefreshScheduler, watch::Sender<SessionState>) {
        let (tx, rx) = watch::channel(session);
        (RefreshScheduler::new(source, rx, config), tx)
    }

    fn scheduler(
        source: Arc<MockSource>,
        session: SessionState,
    ) -> (RefreshScheduler, watch::Sender<SessionState>) {
        scheduler_with(source, session, SchedulerConfig::default())
    }

    // =========================================================================
    // Coalescing
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_subscribes_share_one_fetch() {
        let source = MockSource::with_delay(Duration::from_millis(100));
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut subs: Vec<_> = (0..10)
            .map(|_| scheduler.subscribe(aapl(), Priority::Normal))
            .collect();

        let mut snapshots = Vec::new();
        for sub in &mut subs {
            snapshots.push(sub.recv().await.unwrap().unwrap());
        }

        assert_eq!(source.quote_calls(), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
        assert_eq!(scheduler.stats().subscribers, 10);
        assert_eq!(scheduler.stats().entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_joins_in_flight_fetch() {
        let source = MockSource::with_delay(Duration::from_millis(500));
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);
        let _sub = scheduler.subscribe(aapl(), Priority::Normal);

        let symbol = aapl();
        let (a, b) = tokio::join!(
            scheduler.refresh(&symbol, Priority::Normal),
            scheduler.refresh(&symbol, Priority::Normal)
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(source.quote_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_served_without_fetch() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut first = scheduler.subscribe(aapl(), Priority::Normal);
        first.recv().await.unwrap().unwrap();

        let mut second = scheduler.subscribe(aapl(), Priority::Normal);
        let snapshot = second.recv().await.unwrap().unwrap();
        assert_eq!(snapshot.quote.price, dec!(400));
        assert_eq!(source.quote_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_priorities_are_separate_keys() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut high = scheduler.subscribe(aapl(), Priority::High);
        let mut normal = scheduler.subscribe(aapl(), Priority::Normal);
        high.recv().await.unwrap().unwrap();
        normal.recv().await.unwrap().unwrap();

        assert_eq!(source.quote_calls(), 2);
        assert_eq!(scheduler.stats().entries, 2);
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_live_high_refreshes_every_five_seconds() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        sub.recv().await.unwrap().unwrap();
        let first = Instant::now();

        source.set_price(dec!(401));
        let snapshot = sub.recv().await.unwrap().unwrap();

        assert!(within(first.elapsed(), 5));
        assert_eq!(snapshot.quote.price, dec!(401));
        assert_eq!(source.quote_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_change_wakes_sleeping_timer() {
        let source = MockSource::new();
        let (scheduler, session) = scheduler(source.clone(), SessionState::Closed);

        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        sub.recv().await.unwrap().unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let changed_at = Instant::now();
        session.send(SessionState::Live).unwrap();

        sub.recv().await.unwrap().unwrap();
        // Due 5 s after the first fetch, not 300 s.
        assert!(within(changed_at.elapsed(), 3));
        assert_eq!(scheduler.current_session(), SessionState::Live);
    }

    // =========================================================================
    // Failure handling
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_serve_last_value_degraded() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        let good = sub.recv().await.unwrap().unwrap();
        assert!(!good.quote.degraded);

        source.set_mode(Mode::Fail);
        let started = Instant::now();
        let degraded = sub.recv().await.unwrap().unwrap();

        assert!(degraded.quote.degraded);
        assert_eq!(degraded.quote.price, good.quote.price);
        assert_eq!(degraded.indicators, good.indicators);
        // One attempt plus two retries, one second apart.
        assert_eq!(source.quote_calls(), 4);
        assert!(within(started.elapsed(), 17));

        let quote = scheduler.get(&aapl(), Priority::Normal).unwrap();
        assert!(quote.degraded);
        assert_eq!(quote.price, dec!(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_value_publishes_source_unavailable() {
        let source = MockSource::new();
        source.set_mode(Mode::Fail);
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        let update = sub.recv().await.unwrap();

        assert_eq!(
            update.unwrap_err(),
            FeedError::SourceUnavailable {
                symbol: "AAPL".to_string()
            }
        );
        assert_eq!(source.quote_calls(), 3);
        assert!(matches!(
            scheduler.get(&aapl(), Priority::Normal),
            Err(FeedError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_symbol_is_not_retried() {
        let source = MockSource::new();
        source.set_mode(Mode::UnknownSymbol);
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(Symbol::parse("NOPE").unwrap(), Priority::High);
        let update = sub.recv().await.unwrap();

        assert!(matches!(update, Err(FeedError::InvalidSymbol { .. })));
        assert_eq!(source.quote_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_clears_degraded_flag() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        sub.recv().await.unwrap().unwrap();

        source.set_mode(Mode::Fail);
        assert!(sub.recv().await.unwrap().unwrap().quote.degraded);

        source.set_mode(Mode::Succeed);
        let recovered = sub.recv().await.unwrap().unwrap();
        assert!(!recovered.quote.degraded);
        assert!(!scheduler.get(&aapl(), Priority::High).unwrap().degraded);
    }

    // =========================================================================
    // Staleness
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_get_flags_values_past_staleness() {
        let config = SchedulerConfig {
            staleness: RefreshTable {
                closed: TierDurations::uniform(Duration::from_secs(100)),
                ..RefreshTable::default_staleness()
            },
            ..SchedulerConfig::default()
        };
        let source = MockSource::new();
        let (scheduler, _session) = scheduler_with(source.clone(), SessionState::Closed, config);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        sub.recv().await.unwrap().unwrap();
        assert!(!scheduler.get(&aapl(), Priority::Normal).unwrap().degraded);

        tokio::time::sleep(Duration::from_secs(150)).await;
        let quote = scheduler.get(&aapl(), Priority::Normal).unwrap();
        assert!(quote.degraded);
        assert_eq!(quote.price, dec!(400));
        assert_eq!(source.quote_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_before_first_fetch() {
        let source = MockSource::with_delay(Duration::from_secs(1));
        let (scheduler, _session) = scheduler(source, SessionState::Closed);

        assert!(matches!(
            scheduler.get(&aapl(), Priority::Normal),
            Err(FeedError::NotTracked { .. })
        ));

        let _sub = scheduler.subscribe(aapl(), Priority::Normal);
        assert!(matches!(
            scheduler.get(&aapl(), Priority::Normal),
            Err(FeedError::Pending { .. })
        ));
    }

    // =========================================================================
    // Indicators and history
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_carries_indicators_and_factors() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        let snapshot = sub.recv().await.unwrap().unwrap();

        assert!(snapshot.indicators.sma_200.is_some());
        assert_eq!(snapshot.indicators.rsi, Some(100.0));
        let titles: Vec<_> = snapshot.factors.iter().map(|f| f.title.as_str()).collect();
        assert!(titles.contains(&"Overbought"));
        assert!(titles.contains(&"Uptrend confirmed"));
        assert_eq!(snapshot.quote.change, dec!(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_cached_between_refreshes() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        sub.recv().await.unwrap().unwrap();
        sub.recv().await.unwrap().unwrap();

        assert_eq!(source.quote_calls(), 2);
        assert_eq!(source.history_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_failure_keeps_previous_bars() {
        let config = SchedulerConfig {
            history_refresh: Duration::ZERO,
            ..SchedulerConfig::default()
        };
        let source = MockSource::new();
        let (scheduler, _session) = scheduler_with(source.clone(), SessionState::Live, config);

        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        let first = sub.recv().await.unwrap().unwrap();

        source.fail_history.store(true, Ordering::SeqCst);
        let second = sub.recv().await.unwrap().unwrap();

        assert_eq!(source.history_calls(), 2);
        assert!(!second.quote.degraded);
        assert_eq!(first.indicators, second.indicators);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_evicts_after_grace_period() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        sub.recv().await.unwrap().unwrap();
        sub.unsubscribe();

        assert_eq!(scheduler.stats().entries, 1);
        assert_eq!(scheduler.stats().subscribers, 0);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(scheduler.stats().entries, 1);
        assert!(scheduler.get(&aapl(), Priority::Normal).is_ok());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scheduler.stats().entries, 0);
        assert!(matches!(
            scheduler.get(&aapl(), Priority::Normal),
            Err(FeedError::NotTracked { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_within_grace_keeps_entry() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
        sub.recv().await.unwrap().unwrap();
        drop(sub);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut again = scheduler.subscribe(aapl(), Priority::Normal);
        assert!(again.has_live_timer());
        assert!(again.recv().await.unwrap().is_ok());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(scheduler.stats().entries, 1);
        assert_eq!(source.quote_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_fetch_completes_after_unsubscribe() {
        let source = MockSource::with_delay(Duration::from_secs(2));
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);

        let sub = scheduler.subscribe(aapl(), Priority::Normal);
        tokio::task::yield_now().await;
        drop(sub);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let quote = scheduler.get(&aapl(), Priority::Normal).unwrap();
        assert_eq!(quote.price, dec!(400));
        assert_eq!(scheduler.stats().in_flight, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callbacks_stop_on_unsubscribe() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let seen = Arc::new(AtomicUsize::new(0));
        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        let counter = seen.clone();
        sub.on_update(move |update| {
            assert!(update.is_ok());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        let _other = scheduler.subscribe(aapl(), Priority::High);
        sub.unsubscribe();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(source.quote_calls() >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_yields_updates_in_order() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let stream = scheduler.subscribe(aapl(), Priority::High).into_stream();
        futures::pin_mut!(stream);

        let first = stream.next().await.unwrap().unwrap();
        source.set_price(dec!(410));
        let second = stream.next().await.unwrap().unwrap();

        assert_eq!(first.quote.price, dec!(400));
        assert_eq!(second.quote.price, dec!(410));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timers() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Live);

        let mut a = scheduler.subscribe(aapl(), Priority::High);
        let mut b = scheduler.subscribe(Symbol::parse("MSFT").unwrap(), Priority::Normal);
        a.recv().await.unwrap().unwrap();
        b.recv().await.unwrap().unwrap();

        let stats = scheduler.stats();
        assert_eq!((stats.entries, stats.subscribers), (2, 2));

        scheduler.shutdown();
        let calls = source.quote_calls();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.quote_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_requires_subscription() {
        let (scheduler, _session) = scheduler(MockSource::new(), SessionState::Live);
        let update = scheduler.refresh(&aapl(), Priority::High).await;
        assert!(matches!(update, Err(FeedError::NotTracked { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recv_waits_after_scheduler_dropped() {
        let (scheduler, _session) = scheduler(MockSource::new(), SessionState::Live);
        let mut sub = scheduler.subscribe(aapl(), Priority::High);
        sub.recv().await.unwrap().unwrap();
        drop(scheduler);

        let next = tokio::time::timeout(Duration::from_secs(60), sub.recv()).await;
        assert!(next.is_err());
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    fn fast_config(interval: Duration) -> SchedulerConfig {
        SchedulerConfig {
            intervals: RefreshTable {
                live: TierDurations::uniform(interval),
                ..RefreshTable::default_intervals()
            },
            ..SchedulerConfig::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_release_racing_resubscribe_keeps_timer() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler_with(
            source.clone(),
            SessionState::Live,
            fast_config(Duration::from_millis(20)),
        );

        for round in 0..50 {
            let first = scheduler.subscribe(aapl(), Priority::High);
            let barrier = Arc::new(tokio::sync::Barrier::new(2));

            let racer = scheduler.clone();
            let racer_barrier = barrier.clone();
            let resubscribe = tokio::spawn(async move {
                racer_barrier.wait().await;
                racer.subscribe(aapl(), Priority::High)
            });

            barrier.wait().await;
            drop(first);
            let mut second = resubscribe.await.unwrap();

            assert!(second.has_live_timer(), "round {} lost its timer", round);
            assert_eq!(scheduler.stats().subscribers, 1);

            // At most one update predates the timer: the current value or a
            // fetch already in flight at subscribe time.
            let refreshed = tokio::time::timeout(Duration::from_secs(2), async {
                for _ in 0..3 {
                    second.recv().await.unwrap().unwrap();
                }
            })
            .await;
            assert!(refreshed.is_ok(), "round {} stopped refreshing", round);
        }

        assert_eq!(scheduler.stats().entries, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_churn_keeps_anchor_refreshing() {
        let source = MockSource::new();
        let (scheduler, _session) = scheduler_with(
            source.clone(),
            SessionState::Live,
            fast_config(Duration::from_millis(50)),
        );
        let anchor = scheduler.subscribe(aapl(), Priority::High);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let sub = scheduler.subscribe(aapl(), Priority::High);
                        tokio::task::yield_now().await;
                        drop(sub);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }
        assert_eq!(scheduler.stats().subscribers, 1);
        assert!(anchor.has_live_timer());

        let before = source.quote_calls();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(source.quote_calls() > before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_subscribes_and_refreshes_share_one_fetch() {
        let source = MockSource::with_delay(Duration::from_millis(300));
        let (scheduler, _session) = scheduler(source.clone(), SessionState::Closed);
        let barrier = Arc::new(tokio::sync::Barrier::new(16));

        let callers: Vec<_> = (0..16)
            .map(|i| {
                let scheduler = scheduler.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    let mut sub = scheduler.subscribe(aapl(), Priority::Normal);
                    let update = if i % 2 == 0 {
                        scheduler.refresh(&aapl(), Priority::Normal).await
                    } else {
                        sub.recv().await.unwrap()
                    };
                    (update.unwrap().quote.price, sub)
                })
            })
            .collect();

        let mut subs = Vec::new();
        for caller in callers {
            let (price, sub) = caller.await.unwrap();
            assert_eq!(price, dec!(400));
            subs.push(sub);
        }
        assert_eq!(source.quote_calls(), 1);
        assert_eq!(scheduler.stats().subscribers, 16);

        drop(subs);
        assert_eq!(scheduler.stats().subscribers, 0);
    }
}
