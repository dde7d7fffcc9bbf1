//! Gateway configuration passthrough.

use axum::extract::State;
use axum::{Json, Router, routing::get};

use crate::config::GatewayBindings;
use crate::state::AppState;

/// GET /bindings
async fn bindings(State(state): State<AppState>) -> Json<GatewayBindings> {
    Json(state.bindings)
}

/// Returns the config router.
pub fn router() -> Router<AppState> {
    Router::new().route("/bindings", get(bindings))
}
