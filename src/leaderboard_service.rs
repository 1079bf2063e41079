//! Leaderboard business rules on top of the repository.

use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::{
    DbError, GameRecord, LeaderboardRepository, NewGameRecord, Player, PlayerStats,
    SubmitScoreRequest, ZombieKill,
};

/// Failure of a leaderboard operation.
#[derive(Debug, Clone, Display, Error, derive_more::From)]
pub enum ServiceError {
    /// The request is malformed.
    #[display("Invalid request: {reason}")]
    Invalid {
        /// What is wrong with it.
        reason: String,
    },
    /// No player with this id exists.
    #[display("Player {player_id} not found")]
    PlayerNotFound {
        /// The unknown id.
        player_id: i32,
    },
    /// Storage failed.
    #[display("{_0}")]
    #[from]
    Storage(DbError),
}

impl ServiceError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Service layer for player registration and score recording.
///
/// Wraps [`LeaderboardRepository`] with validation and get-or-create
/// semantics keyed on the employee identifier.
#[derive(Debug, Clone)]
pub struct LeaderboardService {
    repository: LeaderboardRepository,
}

impl LeaderboardService {
    /// Creates a service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: LeaderboardRepository) -> Self {
        info!("Creating LeaderboardService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &LeaderboardRepository {
        &self.repository
    }

    /// Returns the player registered under `employee_id`, creating it if needed.
    ///
    /// A player who comes back under a new display name keeps their id and
    /// has the name updated.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for blank fields, or a storage error.
    #[instrument(skip(self))]
    pub fn register_player(&self, name: &str, employee_id: &str) -> Result<Player, ServiceError> {
        let name = name.trim();
        let employee_id = employee_id.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("name must not be empty"));
        }
        if employee_id.is_empty() {
            return Err(ServiceError::invalid("employee_id must not be empty"));
        }

        // Databases that predate deduplication can hold several rows per
        // employee id, so an exact match wins over renaming the earliest one.
        if let Some(existing) = self.repository.get_player_by_identity(name, employee_id)? {
            debug!(player_id = existing.id(), "Existing player found");
            return Ok(existing);
        }

        if let Some(existing) = self.repository.get_player_by_employee_id(employee_id)? {
            info!(
                player_id = existing.id(),
                old_name = %existing.name(),
                new_name = %name,
                "Existing player changed display name"
            );
            return Ok(self
                .repository
                .rename_player(*existing.id(), name.to_string())?);
        }

        info!(employee_id = %employee_id, "Registering new player");
        Ok(self
            .repository
            .create_player(name.to_string(), employee_id.to_string())?)
    }

    /// Looks up a player, failing if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] or a storage error.
    #[instrument(skip(self))]
    pub fn player(&self, player_id: i32) -> Result<Player, ServiceError> {
        self.repository
            .get_player(player_id)?
            .ok_or(ServiceError::PlayerNotFound { player_id })
    }

    /// Validates and stores a score submission.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for negative numbers or blank zombie
    /// types, [`ServiceError::PlayerNotFound`] for an unknown player, or a
    /// storage error.
    #[instrument(skip(self, request), fields(player_id = request.player_id, score = request.score))]
    pub fn submit_score(
        &self,
        request: &SubmitScoreRequest,
    ) -> Result<(GameRecord, Vec<ZombieKill>), ServiceError> {
        if request.score < 0 {
            return Err(ServiceError::invalid("score must not be negative"));
        }
        if request.game_duration < 0 {
            return Err(ServiceError::invalid("game_duration must not be negative"));
        }
        if let Some((zombie_type, count)) = request
            .zombies_killed
            .iter()
            .find(|(zombie_type, count)| zombie_type.trim().is_empty() || **count < 0)
        {
            warn!(zombie_type = %zombie_type, count, "Rejecting kill entry");
            return Err(ServiceError::invalid(format!(
                "invalid kill entry '{}': {}",
                zombie_type, count
            )));
        }

        self.player(request.player_id)?;

        let kills: Vec<(String, i32)> = request
            .zombies_killed
            .iter()
            .map(|(zombie_type, count)| (zombie_type.clone(), *count))
            .collect();
        let record = NewGameRecord::new(request.player_id, request.score, request.game_duration);
        let stored = self.repository.record_game(record, &kills)?;

        info!(game_record_id = stored.0.id(), "Score submitted");
        Ok(stored)
    }

    /// Best game per player, clamped to `1..=100` entries.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<(GameRecord, Player)>, ServiceError> {
        Ok(self.repository.leaderboard(limit.clamp(1, 100))?)
    }

    /// A player with their aggregate stats.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] or a storage error.
    #[instrument(skip(self))]
    pub fn profile(&self, player_id: i32) -> Result<(Player, PlayerStats), ServiceError> {
        let player = self.player(player_id)?;
        let stats = self.repository.player_stats(player_id)?;
        Ok((player, stats))
    }

    /// A player's recent games, clamped to `1..=100` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] or a storage error.
    #[instrument(skip(self))]
    pub fn history(
        &self,
        player_id: i32,
        limit: i64,
    ) -> Result<Vec<(GameRecord, Vec<ZombieKill>)>, ServiceError> {
        self.player(player_id)?;
        Ok(self
            .repository
            .player_history(player_id, limit.clamp(1, 100))?)
    }
}
