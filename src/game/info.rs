//! Results and identity carried from screen to screen.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::SubmitScoreRequest;
use crate::game::{KillTally, Level, LevelOutcome};

/// Who is playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PlayerIdentity {
    name: String,
    employee_id: String,
    player_id: Option<i32>,
}

impl PlayerIdentity {
    /// Creates an identity that has not been registered with the server yet.
    pub fn new(name: String, employee_id: String) -> Self {
        Self {
            name,
            employee_id,
            player_id: None,
        }
    }

    /// Returns this identity bound to the server-side player id.
    pub fn registered(self, player_id: i32) -> Self {
        Self {
            player_id: Some(player_id),
            ..self
        }
    }
}

/// Persistence record handed across screen transitions.
///
/// Sessions start offline until a player registers successfully with the
/// leaderboard server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameInfo {
    player: Option<PlayerIdentity>,
    is_offline: bool,
    final_score: u32,
    game_duration_ms: u64,
    zombies_killed: KillTally,
    outcome: Option<LevelOutcome>,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            player: None,
            is_offline: true,
            final_score: 0,
            game_duration_ms: 0,
            zombies_killed: KillTally::new(),
            outcome: None,
        }
    }
}

impl GameInfo {
    /// Creates an empty, offline record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record with finished-game results, mainly for report screens.
    #[instrument(skip(zombies_killed))]
    pub fn with_results(
        player: Option<PlayerIdentity>,
        is_offline: bool,
        final_score: u32,
        game_duration_ms: u64,
        zombies_killed: KillTally,
    ) -> Self {
        Self {
            player,
            is_offline,
            final_score,
            game_duration_ms,
            zombies_killed,
            outcome: None,
        }
    }

    /// Sets the player and whether the session talks to the server.
    #[instrument(skip(self))]
    pub fn set_player(&mut self, player: PlayerIdentity, is_offline: bool) {
        self.player = Some(player);
        self.is_offline = is_offline;
    }

    /// Downgrades the session to offline play.
    pub fn go_offline(&mut self) {
        self.is_offline = true;
    }

    /// Clears the previous game's results before a new level.
    pub fn reset_results(&mut self) {
        self.final_score = 0;
        self.game_duration_ms = 0;
        self.zombies_killed = KillTally::new();
        self.outcome = None;
    }

    /// Copies the results of a finished (or abandoned) level.
    #[instrument(skip(self, level))]
    pub fn record_level(&mut self, level: &Level) {
        self.final_score = level.score();
        self.game_duration_ms = *level.elapsed_ms();
        self.zombies_killed = level.kills().clone();
        self.outcome = *level.outcome();
        debug!(
            final_score = self.final_score,
            duration_ms = self.game_duration_ms,
            kills = self.zombies_killed.total(),
            "Level results recorded"
        );
    }

    /// The score submission for this game, if the session is online and the
    /// player is registered.
    #[instrument(skip(self))]
    pub fn submission(&self) -> Option<SubmitScoreRequest> {
        if self.is_offline {
            return None;
        }
        let player_id = (*self.player.as_ref()?.player_id())?;
        Some(SubmitScoreRequest {
            player_id,
            score: i32::try_from(self.final_score).unwrap_or(i32::MAX),
            game_duration: i32::try_from(self.game_duration_ms).unwrap_or(i32::MAX),
            zombies_killed: self.zombies_killed.to_wire(),
        })
    }
}
