//! FOB Contest API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use fob_api::config::AppConfig;
use fob_api::error::AppError;
use fob_api::routes;
use fob_api::state::AppState;
use fob_backup::{FileSnapshotStore, SnapshotBackupService};
use fob_contest::application::lifecycle::ContestService;
use fob_contest::application::store::ContestStore;
use fob_core::clock::{Clock, SystemClock};
use fob_core::repository::EventRepository;
use fob_event_store::pg_event_repository::PgEventRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting FOB contest API server");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(pool));
    let backup = Arc::new(SnapshotBackupService::new(
        Arc::clone(&repository),
        Arc::new(FileSnapshotStore::new(&config.backup_dir)),
        Arc::clone(&clock),
    ));
    let contests = ContestService::new(
        ContestStore::new(repository),
        clock,
        backup,
        config.contest.clone(),
    );

    if let Some(report) = contests.resume().await? {
        tracing::info!(
            contest_id = %report.contest.contest_id,
            backup = ?report.backup,
            "closed contest whose deadline passed while offline"
        );
    }

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set; admin routes will reject every request");
    }
    let app_state = AppState::new(contests, config.admin_token.clone(), config.bindings.clone());

    // TODO: Replace CorsLayer::permissive() with the gateway's origin once it is fixed.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
