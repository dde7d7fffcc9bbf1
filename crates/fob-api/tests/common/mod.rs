//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use fob_contest::application::lifecycle::ContestService;
use fob_contest::application::store::ContestStore;
use fob_contest::settings::ContestSettings;
use fob_test_support::{InMemoryEventRepository, ManualClock, RecordingBackup};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fob_api::config::GatewayBindings;
use fob_api::routes;
use fob_api::routes::admin::ADMIN_TOKEN_HEADER;
use fob_api::state::AppState;

/// Admin token every test app accepts.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// A router wired to in-memory infrastructure, plus handles to inspect it.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub backup: Arc<RecordingBackup>,
    pub repo: Arc<InMemoryEventRepository>,
}

/// 2026-01-15 10:00 UTC, 04:00 in Chicago.
pub fn start_time() -> chrono::DateTime<chrono::Utc> {
    chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap()
}

/// Build the full app router with default settings.
pub fn build_test_app() -> TestApp {
    build_test_app_with(ContestSettings::default(), GatewayBindings::default())
}

/// Build the full app router. Uses the same route tree as `main.rs`.
pub fn build_test_app_with(settings: ContestSettings, bindings: GatewayBindings) -> TestApp {
    let clock = Arc::new(ManualClock::new(start_time()));
    let backup = Arc::new(RecordingBackup::new());
    let repo = Arc::new(InMemoryEventRepository::new());
    let contests = ContestService::new(
        ContestStore::new(repo.clone()),
        clock.clone(),
        backup.clone(),
        settings,
    );
    let app_state = AppState::new(contests, Some(ADMIN_TOKEN.to_owned()), bindings);

    TestApp {
        router: routes::router().with_state(app_state),
        clock,
        backup,
        repo,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&serde_json::Value>,
    admin: bool,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header(ADMIN_TOKEN_HEADER, ADMIN_TOKEN);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a public POST request with a JSON body.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, Method::POST, uri, Some(body), false).await
}

/// Send a public GET request.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Method::GET, uri, None, false).await
}

/// Send an admin request, with an optional JSON body.
pub async fn admin(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send(app, method, uri, body, true).await
}

/// Create and open a contest with the given prizes.
pub async fn open_contest(app: &Router, prizes: &[&str]) {
    let (status, _) = admin(
        app,
        Method::POST,
        "/api/v1/admin/contests",
        Some(&serde_json::json!({ "prizes": prizes })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = admin(app, Method::POST, "/api/v1/admin/open", None).await;
    assert_eq!(status, StatusCode::OK);
}

/// Submit a guess.
pub async fn enter(
    app: &Router,
    participant_id: &str,
    guess: &str,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        "/api/v1/contest/enter",
        &serde_json::json!({ "participant_id": participant_id, "guess": guess }),
    )
    .await
}
