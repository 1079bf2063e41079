//! Lawn Defense library - terminal tower defense with a leaderboard service
//!
//! # Architecture
//!
//! - **Game**: deterministic level simulation, kill tallies and the
//!   [`GameInfo`] record carried between screens
//! - **Screens**: menu, level and report screens driven by [`GameController`]
//! - **Client**: [`LeaderboardApi`] and its HTTP implementation
//! - **Database**: diesel/SQLite storage of players, games and kill details
//! - **Server**: axum JSON API and leaderboard page
//! - **Maintenance**: duplicate-player cleanup ([`run_cleanup`])
//!
//! # Example
//!
//! ```no_run
//! use lawn_defense::{LeaderboardRepository, LeaderboardService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = LeaderboardRepository::new("game.db".to_string());
//! repository.run_migrations()?;
//!
//! let service = LeaderboardService::new(repository);
//! let player = service.register_player("Ann", "E001")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod client;
mod config;
mod db;
mod game;
mod leaderboard_service;
mod maintenance;
mod screens;
mod server;

// Crate-level exports - Wire types
pub use api::{
    ErrorResponse, GameHistoryEntry, GameHistoryResponse, LeaderboardEntry, LeaderboardResponse,
    PlayerProfileResponse, PlayerResponse, PlayerStatsResponse, RegisterPlayerRequest,
    SubmitScoreRequest, SubmitScoreResponse,
};

// Crate-level exports - Game domain
pub use game::{
    COLUMNS, GameInfo, KillTally, Level, LevelConfig, LevelError, LevelOutcome, Pea, Plant,
    PlantKind, PlayerIdentity, ROWS, Spawn, Wave, Zombie, ZombieKind,
};

// Crate-level exports - Screens
pub use screens::{
    GameController, LevelScreen, MenuField, MenuScreen, ReportAction, ReportScreen, Screen,
    ScreenId, ScreenTransition, SubmissionStatus, format_duration,
};

// Crate-level exports - Client
pub use client::{ClientError, DEFAULT_TIMEOUT, LeaderboardApi, LeaderboardClient};

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_SETTINGS_FILE, GameSettings, ServerConfig};

// Crate-level exports - Database
pub use db::{
    DbError, DbErrorKind, GameRecord, LeaderboardRepository, MIGRATIONS, NewGameRecord, NewPlayer,
    NewZombieKill, Player, PlayerStats, ZombieKill,
};

// Crate-level exports - Service layer
pub use leaderboard_service::{LeaderboardService, ServiceError};

// Crate-level exports - Server
pub use server::{
    ApiError, AppState, DEFAULT_HISTORY_LIMIT, DEFAULT_LEADERBOARD_LIMIT, LimitQuery,
    build_router, serve,
};

// Crate-level exports - Maintenance
pub use maintenance::{
    CleanupReport, DuplicateGroup, MaintenanceError, TableCounts, backup_database,
    clean_duplicate_players, find_duplicate_employee_ids, rebuild_players_table, run_cleanup,
    verify_cleanup,
};
