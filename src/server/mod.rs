//! Leaderboard HTTP service.
//!
//! JSON API under `/api` plus a self-refreshing leaderboard page at `/`.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{DEFAULT_HISTORY_LIMIT, DEFAULT_LEADERBOARD_LIMIT, LimitQuery};

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::{LeaderboardRepository, LeaderboardService, ServerConfig};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: LeaderboardService,
}

impl AppState {
    /// Wraps a service for the router.
    pub fn new(service: LeaderboardService) -> Self {
        Self { service }
    }
}

/// Builds the application router around a leaderboard service.
#[instrument(skip(service))]
pub fn build_router(service: LeaderboardService) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route("/players", post(routes::register_player))
        .route("/players/{id}", get(routes::get_player))
        .route("/players/{id}/history", get(routes::player_history))
        .route("/scores", post(routes::submit_score))
        .route("/leaderboard", get(routes::leaderboard));

    Router::new()
        .route("/", get(routes::index))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState::new(service))
}

/// Runs migrations, binds the listener and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if migrations fail or the address cannot be bound.
#[instrument(skip(config), fields(addr = %config.bind_address(), db = %config.database_path()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let repository = LeaderboardRepository::new(config.database_path().clone());
    let migrate = repository.clone();
    let applied = tokio::task::spawn_blocking(move || migrate.run_migrations()).await??;
    info!(applied, "Database ready");

    let app = build_router(LeaderboardService::new(repository));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Leaderboard server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Leaderboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
