use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use marketpulse_core::{scheduler::SchedulerStats, MarketSnapshot};
use marketpulse_market_data::{Priority, Symbol};
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub(super) struct KeyQuery {
    priority: Option<String>,
}

pub(super) fn parse_key(symbol: &str, query: &KeyQuery) -> ApiResult<(Symbol, Priority)> {
    let symbol = Symbol::parse(symbol)?;
    let priority = match query.priority.as_deref() {
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
        None => Priority::Normal,
    };
    Ok((symbol, priority))
}

/// Latest snapshot for a symbol.
///
/// Subscribes on demand; dropping the subscription afterwards keeps the key
/// cached for the grace period, so repeated polls hit the cache.
async fn get_quote(
    Path(symbol): Path<String>,
    Query(query): Query<KeyQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Arc<MarketSnapshot>>> {
    let (symbol, priority) = parse_key(&symbol, &query)?;
    let mut subscription = state.scheduler.subscribe(symbol.clone(), priority);

    let update = tokio::time::timeout(state.request_timeout, subscription.recv())
        .await
        .map_err(|_| ApiError::Unavailable(format!("Timed out waiting for {}", symbol)))?
        .ok_or_else(|| ApiError::Unavailable("Scheduler is shutting down".to_string()))?;
    Ok(Json(update?))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<SchedulerStats> {
    Json(state.scheduler.stats())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes/{symbol}", get(get_quote))
        .route("/stats", get(get_stats))
}
