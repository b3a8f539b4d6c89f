use std::{convert::Infallible, sync::Arc, time::Duration};

use super::quotes::{parse_key, KeyQuery};
use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::{future, Stream, StreamExt};
use marketpulse_core::FeedUpdate;

fn to_event(update: FeedUpdate) -> Option<SseEvent> {
    let (name, event) = match update {
        Ok(snapshot) => ("quote", SseEvent::default().event("quote").json_data(&*snapshot)),
        Err(e) => (
            "unavailable",
            SseEvent::default().event("unavailable").json_data(&e),
        ),
    };
    match event {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::error!("Failed to serialize SSE payload for {}: {}", name, err);
            None
        }
    }
}

/// Push every refresh of a key to the client.
///
/// The subscription lives inside the stream, so a client disconnect drops
/// it and unsubscribes.
async fn stream_quote(
    Path(symbol): Path<String>,
    Query(query): Query<KeyQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let (symbol, priority) = parse_key(&symbol, &query)?;
    tracing::debug!("Opening quote stream for {} [{}]", symbol, priority);

    let updates = state.scheduler.subscribe(symbol, priority).into_stream();
    let stream = updates.filter_map(|update| future::ready(to_event(update).map(Ok)));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quotes/{symbol}/stream", get(stream_quote))
}
