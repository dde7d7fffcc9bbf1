//! FOB Contest API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fob_core::error::{DomainError, EntryRejection};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable or config value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Startup recovery of the active contest failed.
    #[error("recovery error: {0}")]
    Recovery(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            DomainError::EntryRejected(reason) => match reason {
                EntryRejection::UnknownLocation(_) => (StatusCode::BAD_REQUEST, "unknown_location"),
                EntryRejection::NotOpen => (StatusCode::CONFLICT, "contest_not_open"),
                EntryRejection::DeadlinePassed => (StatusCode::CONFLICT, "deadline_passed"),
                EntryRejection::LocationTaken(_) => (StatusCode::CONFLICT, "location_taken"),
            },
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Rejection for admin routes called without the right token.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "unauthorized",
            message: "a valid admin token is required".to_string(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::NotFound("no active contest".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_and_unknown_location_map_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(EntryRejection::UnknownLocation("Jita".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_phase_violations_map_to_409() {
        let conflicts = [
            DomainError::InvalidTransition {
                action: "open the contest",
                status: "ended".into(),
            },
            EntryRejection::NotOpen.into(),
            EntryRejection::DeadlinePassed.into(),
            EntryRejection::LocationTaken("Tama".into()).into(),
            DomainError::ConcurrencyConflict {
                aggregate_id: Uuid::new_v4(),
                expected: 1,
                actual: 2,
            },
        ];

        for err in conflicts {
            assert_eq!(status_of(err), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_carries_code_and_message() {
        let response = ApiError(EntryRejection::DeadlinePassed.into()).into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "deadline_passed");
        assert_eq!(json["message"], "entry rejected: the entry deadline has passed");
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        assert_eq!(Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
