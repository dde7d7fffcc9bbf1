//! Public contest routes: entering, looking up a guess, history and rules.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use chrono::{DateTime, Utc};
use fob_contest::application::query_handlers::{ContestSummary, PrizesView, RulesView};
use fob_contest::domain::entries::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /allowed-systems.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    /// Case-insensitive substring to match; empty lists the first page.
    #[serde(default)]
    pub q: String,
}

/// Request body for POST /enter.
#[derive(Debug, Deserialize)]
pub struct EnterRequest {
    /// Gateway user id of the participant.
    pub participant_id: String,
    /// The guessed location.
    pub guess: String,
}

/// Response body for GET /utc-now.
#[derive(Debug, Serialize)]
pub struct UtcNowResponse {
    /// Current instant.
    pub utc_now: DateTime<Utc>,
}

/// GET /allowed-systems
#[instrument(skip(state))]
async fn allowed_systems(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.contests.allowed_locations(&query.q).await?))
}

/// POST /enter
#[instrument(skip(state, request), fields(participant_id = %request.participant_id))]
async fn enter(
    State(state): State<AppState>,
    Json(request): Json<EnterRequest>,
) -> Result<Json<Entry>, ApiError> {
    let entry = state
        .contests
        .enter(request.participant_id, request.guess)
        .await?;
    info!(guess = %entry.guess, "entry accepted");
    Ok(Json(entry))
}

/// GET /entries/{participant_id}
#[instrument(skip(state))]
async fn my_entry(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    Ok(Json(state.contests.my_entry(&participant_id).await?))
}

/// GET /history
async fn history(State(state): State<AppState>) -> Result<Json<Vec<ContestSummary>>, ApiError> {
    Ok(Json(state.contests.history().await?))
}

/// GET /past-winners
async fn past_winners(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContestSummary>>, ApiError> {
    Ok(Json(state.contests.past_winners().await?))
}

/// GET /prizes
async fn prizes(State(state): State<AppState>) -> Result<Json<PrizesView>, ApiError> {
    Ok(Json(state.contests.prizes().await?))
}

async fn rules(State(state): State<AppState>) -> Json<RulesView> {
    Json(state.contests.rules())
}

async fn utc_now(State(state): State<AppState>) -> Json<UtcNowResponse> {
    Json(UtcNowResponse {
        utc_now: state.contests.utc_now(),
    })
}

/// Returns the router for public contest commands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/allowed-systems", get(allowed_systems))
        .route("/enter", post(enter))
        .route("/entries/{participant_id}", get(my_entry))
        .route("/history", get(history))
        .route("/past-winners", get(past_winners))
        .route("/prizes", get(prizes))
        .route("/rules", get(rules))
        .route("/utc-now", get(utc_now))
}
