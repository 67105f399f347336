use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use localbib_core::LoadError;

use crate::state::AppState;

pub async fn reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.reload().await {
        Ok(n) => (StatusCode::OK, format!("loaded {n} entries")),
        Err(LoadError::Busy) => (StatusCode::CONFLICT, LoadError::Busy.to_string()),
        Err(e @ LoadError::ParseUnavailable(_)) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
