use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use localbib_core::generate_raw;

use crate::state::AppState;

/// Regenerated BibTeX for one entry as plain text.
pub async fn raw(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    let view = state.view.read().await;
    match view.find(&key) {
        Some(entry) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            generate_raw(entry),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, format!("no entry with key `{key}`")).into_response(),
    }
}
