//! Admin routes: the contest lifecycle commands.
//!
//! Every handler takes [`RequireAdmin`], which checks the `x-admin-token`
//! header against the configured token.

use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::{Json, Router, routing::get, routing::post, routing::put};
use fob_contest::application::lifecycle::LifecycleReport;
use fob_contest::application::query_handlers::{ContestStatusView, ContestView};
use fob_contest::domain::entries::Entry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{ApiError, Unauthorized};
use crate::state::AppState;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor that only succeeds for requests with the admin token.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Unauthorized;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        match (state.admin_token.as_deref(), provided) {
            (Some(expected), Some(provided)) if tokens_match(expected, provided) => Ok(Self),
            _ => Err(Unauthorized),
        }
    }
}

/// Compares SHA-256 digests of both tokens without short-circuiting, so the
/// time taken does not depend on where they differ or on their lengths.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let provided = Sha256::digest(provided.as_bytes());
    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Request body for POST /contests.
#[derive(Debug, Default, Deserialize)]
pub struct NewContestRequest {
    /// Allowed locations; the configured registry when absent.
    #[serde(default)]
    pub locations: Option<Vec<String>>,
    /// Prizes in rank order.
    #[serde(default)]
    pub prizes: Option<Vec<String>>,
}

/// Request body for PUT /locations.
#[derive(Debug, Deserialize)]
pub struct LocationsRequest {
    /// The new allowed locations.
    pub locations: Vec<String>,
}

/// Request body for PUT /prizes.
#[derive(Debug, Deserialize)]
pub struct PrizesRequest {
    /// Prizes in rank order.
    pub prizes: Vec<String>,
}

/// Request body for POST /deadline.
#[derive(Debug, Deserialize)]
pub struct DeadlineRequest {
    /// `YYYY-MM-DD HH:MM` or `HH:MM` wall-clock time.
    pub time: String,
    /// Source zone; the configured default when absent.
    #[serde(default)]
    pub zone: Option<String>,
}

/// Request body for POST /end.
#[derive(Debug, Deserialize)]
pub struct EndRequest {
    /// The location the FOB actually appeared in.
    pub result: String,
}

/// Response body for POST /backup.
#[derive(Debug, Serialize)]
pub struct BackupResponse {
    /// Identifier of the written snapshot.
    pub snapshot_id: Uuid,
}

/// POST /contests
#[instrument(skip(state, request))]
async fn new_contest(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    request: Option<Json<NewContestRequest>>,
) -> Result<(StatusCode, Json<ContestView>), ApiError> {
    let Json(request) = request.unwrap_or_default();
    let contest = state
        .contests
        .new_contest(request.locations, request.prizes)
        .await?;
    info!(contest_id = %contest.contest_id, number = contest.number, "contest created via api");
    Ok((StatusCode::CREATED, Json(contest)))
}

/// PUT /locations
#[instrument(skip(state, request))]
async fn set_locations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<LocationsRequest>,
) -> Result<Json<ContestView>, ApiError> {
    Ok(Json(state.contests.set_locations(request.locations).await?))
}

/// POST /open
#[instrument(skip(state))]
async fn open(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ContestView>, ApiError> {
    Ok(Json(state.contests.open_contest().await?))
}

/// POST /close
#[instrument(skip(state))]
async fn close(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<LifecycleReport>, ApiError> {
    Ok(Json(state.contests.close_contest().await?))
}

/// POST /deadline
#[instrument(skip(state, request), fields(time = %request.time))]
async fn set_deadline(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<DeadlineRequest>,
) -> Result<Json<ContestView>, ApiError> {
    Ok(Json(
        state
            .contests
            .set_deadline(request.time, request.zone)
            .await?,
    ))
}

/// DELETE /deadline
#[instrument(skip(state))]
async fn clear_deadline(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ContestView>, ApiError> {
    Ok(Json(state.contests.clear_deadline().await?))
}

/// PUT /prizes
#[instrument(skip(state, request))]
async fn set_prizes(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<PrizesRequest>,
) -> Result<Json<ContestView>, ApiError> {
    Ok(Json(state.contests.set_prizes(request.prizes).await?))
}

/// POST /end
#[instrument(skip(state, request), fields(result = %request.result))]
async fn end(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<EndRequest>,
) -> Result<Json<LifecycleReport>, ApiError> {
    Ok(Json(state.contests.end_contest(request.result).await?))
}

/// GET /entries
async fn list_entries(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    Ok(Json(state.contests.list_entries().await?))
}

/// GET /status
async fn status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ContestStatusView>, ApiError> {
    Ok(Json(state.contests.status().await?))
}

/// POST /backup
#[instrument(skip(state))]
async fn backup(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<BackupResponse>, ApiError> {
    let snapshot_id = state.contests.backup_now().await?;
    Ok(Json(BackupResponse { snapshot_id }))
}

/// Returns the router for admin commands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contests", post(new_contest))
        .route("/locations", put(set_locations))
        .route("/open", post(open))
        .route("/close", post(close))
        .route("/deadline", post(set_deadline).delete(clear_deadline))
        .route("/prizes", put(set_prizes))
        .route("/end", post(end))
        .route("/entries", get(list_entries))
        .route("/status", get(status))
        .route("/backup", post(backup))
}
