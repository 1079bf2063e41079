//! JSON bodies exchanged between the game client and the leaderboard server.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Request to register (or look up) a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPlayerRequest {
    /// Display name.
    pub name: String,
    /// Employee identifier (business key).
    pub employee_id: String,
}

/// A player as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// Player id.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Employee identifier.
    pub employee_id: String,
    /// When the player first registered.
    pub created_at: NaiveDateTime,
}

/// Aggregate numbers for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatsResponse {
    /// Games recorded.
    pub games_played: i64,
    /// Highest score, 0 without games.
    pub best_score: i32,
    /// Zombies defeated across all games.
    pub total_kills: i64,
}

/// A player together with their stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfileResponse {
    /// The player.
    pub player: PlayerResponse,
    /// Their stats.
    pub stats: PlayerStatsResponse,
}

/// Score submission sent when a game ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    /// Registered player id.
    pub player_id: i32,
    /// Final score.
    pub score: i32,
    /// Game length in milliseconds.
    pub game_duration: i32,
    /// Kills per zombie type.
    #[serde(default)]
    pub zombies_killed: BTreeMap<String, i32>,
}

/// Reply to a successful score submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    /// Always `true` on success.
    pub success: bool,
    /// Id of the stored game record.
    pub game_record_id: i32,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    /// Player id.
    pub player_id: i32,
    /// Display name.
    pub name: String,
    /// Employee identifier.
    pub employee_id: String,
    /// Best score.
    pub score: i32,
    /// Duration of that game in milliseconds.
    pub game_duration: i32,
    /// When that game was recorded.
    pub created_at: NaiveDateTime,
}

/// The leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    /// Rows ordered best first.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One past game in a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    /// Game record id.
    pub id: i32,
    /// Score.
    pub score: i32,
    /// Duration in milliseconds.
    pub game_duration: i32,
    /// When it was recorded.
    pub created_at: NaiveDateTime,
    /// Kills per zombie type.
    pub zombies_killed: BTreeMap<String, i32>,
}

/// A player's recent games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryResponse {
    /// Player id.
    pub player_id: i32,
    /// Most recent first.
    pub games: Vec<GameHistoryEntry>,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}
