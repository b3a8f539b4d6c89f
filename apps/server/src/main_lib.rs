use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use marketpulse_core::{
    MarketCalendar, MarketDataClient, RefreshScheduler, SchedulerConfig, SessionMonitor,
    Subscription,
};
use marketpulse_market_data::{Priority, Symbol};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub scheduler: RefreshScheduler,
    pub session_monitor: SessionMonitor,
    pub calendar: Arc<MarketCalendar>,
    /// Watchlist subscriptions, held so those keys never leave the cache.
    pub watchlist: Mutex<Vec<Subscription>>,
    pub request_timeout: Duration,
}

/// Install the global subscriber. `log` records from the library crates are
/// forwarded through tracing-subscriber's log bridge.
pub fn init_tracing() {
    let log_format = std::env::var("MP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let calendar = match &config.calendar_file {
        Some(path) => MarketCalendar::from_file(path)?,
        None => MarketCalendar::nyse(),
    };
    let calendar = Arc::new(calendar);
    let session_monitor = SessionMonitor::spawn(calendar.clone());

    let client = MarketDataClient::new(config.providers.clone(), config.history_url.clone())?;
    tracing::info!("Quote providers: {}", client.providers().join(", "));

    let scheduler = RefreshScheduler::new(
        Arc::new(client),
        session_monitor.subscribe(),
        SchedulerConfig::default(),
    );

    let mut watchlist = Vec::with_capacity(config.watchlist.len());
    for raw in &config.watchlist {
        match Symbol::parse(raw) {
            Ok(symbol) => watchlist.push(scheduler.subscribe(symbol, Priority::High)),
            Err(e) => tracing::warn!("Skipping watchlist entry '{}': {}", raw, e),
        }
    }
    if !watchlist.is_empty() {
        tracing::info!("Watching {} symbols at high priority", watchlist.len());
    }

    Ok(Arc::new(AppState {
        scheduler,
        session_monitor,
        calendar,
        watchlist: Mutex::new(watchlist),
        request_timeout: config.request_timeout,
    }))
}
