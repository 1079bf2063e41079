//! Route handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::Html,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::server::{ApiError, AppState};
use crate::{
    GameHistoryEntry, GameHistoryResponse, GameRecord, LeaderboardEntry, LeaderboardResponse,
    LeaderboardService, Player, PlayerProfileResponse, PlayerResponse, PlayerStats,
    PlayerStatsResponse, RegisterPlayerRequest, ServiceError, SubmitScoreRequest,
    SubmitScoreResponse, ZombieKill,
};

const LEADERBOARD_PAGE: &str = include_str!("leaderboard.html");

/// Default number of leaderboard rows.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
/// Default number of history entries.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// `?limit=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            id: *player.id(),
            name: player.name().clone(),
            employee_id: player.employee_id().clone(),
            created_at: *player.created_at(),
        }
    }
}

impl From<PlayerStats> for PlayerStatsResponse {
    fn from(stats: PlayerStats) -> Self {
        Self {
            games_played: *stats.games_played(),
            best_score: *stats.best_score(),
            total_kills: *stats.total_kills(),
        }
    }
}

fn history_entry(record: GameRecord, kills: Vec<ZombieKill>) -> GameHistoryEntry {
    GameHistoryEntry {
        id: *record.id(),
        score: *record.score(),
        game_duration: *record.game_duration(),
        created_at: *record.created_at(),
        zombies_killed: kills
            .into_iter()
            .map(|kill| (kill.zombie_type().clone(), *kill.count()))
            .collect(),
    }
}

/// Runs a service call on the blocking pool.
async fn blocking<T, F>(service: &LeaderboardService, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&LeaderboardService) -> Result<T, ServiceError> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| ApiError::internal(format!("Worker failed: {}", e)))?
        .map_err(ApiError::from)
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(LEADERBOARD_PAGE)
}

/// `GET /api/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Local::now().naive_local(),
    }))
}

/// `POST /api/players`
#[instrument(skip(state, body))]
pub async fn register_player(
    State(state): State<AppState>,
    body: Result<Json<RegisterPlayerRequest>, JsonRejection>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let Json(request) = body?;
    info!(employee_id = %request.employee_id, "Registration request");
    let player = blocking(&state.service, move |service| {
        service.register_player(&request.name, &request.employee_id)
    })
    .await?;
    Ok(Json(player.into()))
}

/// `GET /api/players/{id}`
#[instrument(skip(state, path))]
pub async fn get_player(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<PlayerProfileResponse>, ApiError> {
    let Path(player_id) = path?;
    let (player, stats) = blocking(&state.service, move |service| service.profile(player_id)).await?;
    Ok(Json(PlayerProfileResponse {
        player: player.into(),
        stats: stats.into(),
    }))
}

/// `GET /api/players/{id}/history`
#[instrument(skip(state, path, query))]
pub async fn player_history(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<GameHistoryResponse>, ApiError> {
    let Path(player_id) = path?;
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let games = blocking(&state.service, move |service| {
        service.history(player_id, limit)
    })
    .await?;

    debug!(player_id, games = games.len(), "History served");
    Ok(Json(GameHistoryResponse {
        player_id,
        games: games
            .into_iter()
            .map(|(record, kills)| history_entry(record, kills))
            .collect(),
    }))
}

/// `POST /api/scores`
#[instrument(skip(state, body))]
pub async fn submit_score(
    State(state): State<AppState>,
    body: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Json<SubmitScoreResponse>, ApiError> {
    let Json(request) = body?;
    let (record, _) = blocking(&state.service, move |service| service.submit_score(&request)).await?;
    Ok(Json(SubmitScoreResponse {
        success: true,
        game_record_id: *record.id(),
    }))
}

/// `GET /api/leaderboard`
#[instrument(skip(state, query))]
pub async fn leaderboard(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, 100) as usize;
    let rows = blocking(&state.service, move |service| service.leaderboard(limit)).await?;

    let leaderboard = rows
        .into_iter()
        .enumerate()
        .map(|(index, (record, player))| LeaderboardEntry {
            rank: index + 1,
            player_id: *player.id(),
            name: player.name().clone(),
            employee_id: player.employee_id().clone(),
            score: *record.score(),
            game_duration: *record.game_duration(),
            created_at: *record.created_at(),
        })
        .collect();

    Ok(Json(LeaderboardResponse { leaderboard }))
}
