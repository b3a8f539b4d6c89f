use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use marketpulse_core::SessionState;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    state: SessionState,
    calendar: String,
    timezone: String,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse {
        state: state.session_monitor.current(),
        calendar: state.calendar.name.clone(),
        timezone: state.calendar.timezone.to_string(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/session", get(get_session))
}
