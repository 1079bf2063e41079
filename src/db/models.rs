//! Database models for players, game records and kill details.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// Registered player.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    name: String,
    employee_id: String,
    created_at: NaiveDateTime,
}

/// Insertable player.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    name: String,
    employee_id: String,
}

/// One finished game.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable, Getters,
)]
#[diesel(table_name = schema::game_records)]
#[diesel(belongs_to(Player))]
pub struct GameRecord {
    id: i32,
    player_id: i32,
    score: i32,
    game_duration: i32,
    created_at: NaiveDateTime,
}

/// Insertable game record.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct NewGameRecord {
    player_id: i32,
    score: i32,
    game_duration: i32,
}

/// How many zombies of one type were defeated in a game.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable, Getters,
)]
#[diesel(table_name = schema::zombie_kills)]
#[diesel(belongs_to(GameRecord))]
pub struct ZombieKill {
    id: i32,
    game_record_id: i32,
    zombie_type: String,
    count: i32,
}

/// Insertable kill-detail row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::zombie_kills)]
pub struct NewZombieKill {
    game_record_id: i32,
    zombie_type: String,
    count: i32,
}

/// Aggregated numbers for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct PlayerStats {
    games_played: i64,
    best_score: i32,
    total_kills: i64,
}
