use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use localbib_core::GroupMode;
use localbib_render::render_page_with;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    /// Search text.
    pub q: Option<String>,
    /// `year` or `type`.
    pub group: Option<String>,
    /// Label of a group whose initial expansion should be flipped.
    pub toggle: Option<String>,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IndexParams>,
) -> Response {
    let mode = match params.group.as_deref().filter(|g| !g.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<GroupMode>() {
            Ok(mode) => Some(mode),
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        },
    };

    let mut view = state.view.read().await.clone();
    if let Some(mode) = mode {
        view.set_group_mode(mode);
    }
    if let Some(q) = params.q.as_deref() {
        view.handle_search(q);
    }

    let mut accordion = view.accordion();
    if let Some(label) = params.toggle.as_deref() {
        let key = view
            .groups()
            .into_iter()
            .find(|g| g.label() == label)
            .map(|g| g.key);
        if let Some(key) = key {
            accordion.toggle(&key);
        }
    }

    Html(render_page_with(&view, &accordion, &state.render)).into_response()
}
