//! Leaderboard persistence: players, game records and kill details.

mod error;
mod models;
mod repository;
pub(crate) mod schema; // Diesel generated schema, shared with the maintenance procedure

pub use error::{DbError, DbErrorKind};
pub use models::{GameRecord, NewGameRecord, NewPlayer, NewZombieKill, Player, PlayerStats, ZombieKill};
pub use repository::{LeaderboardRepository, MIGRATIONS};
