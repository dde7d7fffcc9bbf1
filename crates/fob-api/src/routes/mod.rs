//! Route modules, one per audience.

use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod config;
pub mod contest;
pub mod health;

/// The full route tree, without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/contest", contest::router())
        .nest("/api/v1/admin", admin::router())
        .nest("/api/v1/config", config::router())
}
