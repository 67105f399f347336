//! Web front end: one page with search and grouping driven by query
//! parameters, plus plain-text BibTeX for single entries.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5001";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/raw/{key}", get(handlers::raw::raw))
        .route("/reload", post(handlers::reload::reload))
        .with_state(state)
}
