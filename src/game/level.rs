//! Level configuration and the tick-driven lawn simulation.

use std::collections::BTreeMap;
use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::game::plant::{PlantAction, SUNFLOWER_YIELD};
use crate::game::{COLUMNS, KillTally, Plant, PlantKind, ROWS, Zombie, ZombieKind};

/// Longest slice of time simulated in one step; longer updates are subdivided.
const MAX_STEP_MS: u64 = 50;
/// Pea flight speed in cells per second.
const PEA_SPEED: f32 = 5.0;
const PEA_DAMAGE: i32 = 20;
const SNOW_PEA_CHILL_MS: u64 = 10_000;
/// Damage per second a zombie deals while eating.
const BITE_DPS: i32 = 100;
/// How far into a cell a zombie walks before it starts eating the plant there.
const BITE_REACH: f32 = 0.6;

/// One zombie to spawn as part of a wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    /// Kind of zombie.
    pub kind: ZombieKind,
    /// Lawn row (0 = top).
    pub row: usize,
}

/// A group of zombies released at the same moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// Seconds after the level starts.
    pub at_seconds: u32,
    /// Zombies in this wave.
    pub spawns: Vec<Spawn>,
}

/// Static description of a level, loadable from TOML.
///
/// Deserializing always validates, whatever the format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(try_from = "RawLevelConfig")]
pub struct LevelConfig {
    name: String,
    initial_sun: u32,
    sky_sun_seconds: u32,
    waves: Vec<Wave>,
}

/// Unchecked wire form of [`LevelConfig`].
#[derive(Deserialize)]
struct RawLevelConfig {
    name: String,
    #[serde(default = "default_initial_sun")]
    initial_sun: u32,
    #[serde(default = "default_sky_sun_seconds")]
    sky_sun_seconds: u32,
    waves: Vec<Wave>,
}

impl TryFrom<RawLevelConfig> for LevelConfig {
    type Error = LevelError;

    fn try_from(raw: RawLevelConfig) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.initial_sun, raw.sky_sun_seconds, raw.waves)
    }
}

fn default_initial_sun() -> u32 {
    150
}

fn default_sky_sun_seconds() -> u32 {
    10
}

impl LevelConfig {
    /// Creates a level from its parts, validating rows and sorting waves by time.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::InvalidConfig`] if there are no waves or a spawn row is off the lawn.
    #[instrument(skip(waves), fields(wave_count = waves.len()))]
    pub fn new(
        name: String,
        initial_sun: u32,
        sky_sun_seconds: u32,
        waves: Vec<Wave>,
    ) -> Result<Self, LevelError> {
        let config = Self {
            name,
            initial_sun,
            sky_sun_seconds,
            waves,
        };
        config.validated()
    }

    /// Loads a level from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::InvalidConfig`] if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        debug!("Loading level from file");
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LevelError::InvalidConfig {
                message: format!("Failed to read level file: {}", e),
            }
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(level = %config.name, waves = config.waves.len(), "Level loaded");
        Ok(config)
    }

    /// Parses a level from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::InvalidConfig`] on parse or validation failure.
    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        toml::from_str(content).map_err(|e| LevelError::InvalidConfig {
            message: format!("Failed to parse level: {}", e),
        })
    }

    /// The built-in first level.
    #[instrument]
    pub fn front_lawn() -> Self {
        use ZombieKind::*;
        let wave = |at_seconds: u32, spawns: &[(ZombieKind, usize)]| Wave {
            at_seconds,
            spawns: spawns
                .iter()
                .map(|&(kind, row)| Spawn { kind, row })
                .collect(),
        };
        Self {
            name: "Front Lawn".to_string(),
            initial_sun: default_initial_sun(),
            sky_sun_seconds: default_sky_sun_seconds(),
            waves: vec![
                wave(20, &[(Normal, 2)]),
                wave(35, &[(Normal, 1), (Normal, 3)]),
                wave(55, &[(Conehead, 2), (Normal, 0)]),
                wave(75, &[(Newspaper, 4), (Normal, 2), (Conehead, 1)]),
                wave(95, &[(Flag, 2), (Normal, 0), (Normal, 3), (Conehead, 4)]),
                wave(120, &[(Buckethead, 2), (Newspaper, 1), (Conehead, 3)]),
                wave(
                    150,
                    &[
                        (Flag, 1),
                        (Buckethead, 0),
                        (Conehead, 2),
                        (Newspaper, 3),
                        (Normal, 4),
                        (Normal, 2),
                    ],
                ),
            ],
        }
    }

    /// Total number of zombies across all waves.
    pub fn zombie_count(&self) -> usize {
        self.waves.iter().map(|w| w.spawns.len()).sum()
    }

    fn validated(mut self) -> Result<Self, LevelError> {
        if self.waves.is_empty() {
            return Err(LevelError::InvalidConfig {
                message: format!("Level '{}' has no waves", self.name),
            });
        }
        if let Some(spawn) = self
            .waves
            .iter()
            .flat_map(|w| w.spawns.iter())
            .find(|s| s.row >= ROWS)
        {
            return Err(LevelError::InvalidConfig {
                message: format!(
                    "Spawn row {} is off the lawn (rows 0-{})",
                    spawn.row,
                    ROWS - 1
                ),
            });
        }
        self.waves.sort_by_key(|w| w.at_seconds);
        Ok(self)
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::front_lawn()
    }
}

/// How a level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum LevelOutcome {
    /// Every wave spawned and was defeated.
    #[display("Lawn defended")]
    Cleared,
    /// A zombie reached the house.
    #[display("The zombies ate your brains")]
    Overrun,
    /// The player gave up.
    #[display("Surrendered")]
    Surrendered,
}

/// Errors from level loading and player actions.
#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum LevelError {
    /// The level description is unusable.
    #[display("Invalid level: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },
    /// Cell outside the lawn.
    #[display("Cell ({row}, {col}) is off the lawn")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
    /// A plant already grows there.
    #[display("Cell ({row}, {col}) is already planted")]
    Occupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
    /// The player cannot afford the seed packet.
    #[display("Not enough sun: need {needed}, have {available}")]
    NotEnoughSun {
        /// Seed cost.
        needed: u32,
        /// Sun in the bank.
        available: u32,
    },
    /// The seed packet is still recharging.
    #[display("{kind} is recharging ({remaining_ms} ms left)")]
    Recharging {
        /// Seed packet.
        kind: PlantKind,
        /// Time until it is ready.
        remaining_ms: u64,
    },
    /// The level is already over.
    #[display("The level is over")]
    Finished,
}

/// A pea in flight.
#[derive(Debug, Clone, Copy, PartialEq, Getters)]
pub struct Pea {
    row: usize,
    x: f32,
    chill_ms: u64,
}

/// A running level: lawn, sun bank, zombies, projectiles and results.
#[derive(Debug, Clone, Getters)]
pub struct Level {
    config: LevelConfig,
    #[getter(skip)]
    lawn: Vec<Option<Plant>>,
    zombies: Vec<Zombie>,
    peas: Vec<Pea>,
    mowers: [bool; ROWS],
    sun: u32,
    elapsed_ms: u64,
    next_wave: usize,
    next_sky_sun_ms: u64,
    #[getter(skip)]
    ready_at: BTreeMap<PlantKind, u64>,
    kills: KillTally,
    outcome: Option<LevelOutcome>,
}

impl Level {
    /// Starts a level with an empty lawn and every mower in place.
    #[instrument(skip(config), fields(level = %config.name))]
    pub fn new(config: LevelConfig) -> Self {
        info!(waves = config.waves.len(), "Starting level");
        let sun = config.initial_sun;
        let next_sky_sun_ms = u64::from(config.sky_sun_seconds) * 1000;
        Self {
            config,
            lawn: vec![None; ROWS * COLUMNS],
            zombies: Vec::new(),
            peas: Vec::new(),
            mowers: [true; ROWS],
            sun,
            elapsed_ms: 0,
            next_wave: 0,
            next_sky_sun_ms,
            ready_at: BTreeMap::new(),
            kills: KillTally::new(),
            outcome: None,
        }
    }

    /// The plant growing at `(row, col)`, if any.
    pub fn plant_at(&self, row: usize, col: usize) -> Option<&Plant> {
        if row >= ROWS || col >= COLUMNS {
            return None;
        }
        self.lawn[row * COLUMNS + col].as_ref()
    }

    /// Whether the mower guarding `row` is still available.
    pub fn mower_ready(&self, row: usize) -> bool {
        self.mowers.get(row).copied().unwrap_or(false)
    }

    /// Number of waves not yet released.
    pub fn waves_remaining(&self) -> usize {
        self.config.waves.len() - self.next_wave
    }

    /// Score earned so far.
    pub fn score(&self) -> u32 {
        self.kills.score()
    }

    /// Milliseconds until `kind` can be planted again (0 when ready).
    pub fn recharge_remaining(&self, kind: PlantKind) -> u64 {
        self.ready_at
            .get(&kind)
            .map_or(0, |ready| ready.saturating_sub(self.elapsed_ms))
    }

    /// Plants `kind` at `(row, col)`, spending sun and starting the recharge.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError`] if the level is over, the cell is invalid or
    /// occupied, the player lacks sun, or the packet is recharging.
    #[instrument(skip(self), fields(sun = self.sun))]
    pub fn place_plant(&mut self, kind: PlantKind, row: usize, col: usize) -> Result<(), LevelError> {
        if self.outcome.is_some() {
            return Err(LevelError::Finished);
        }
        if row >= ROWS || col >= COLUMNS {
            return Err(LevelError::OutOfBounds { row, col });
        }
        if self.lawn[row * COLUMNS + col].is_some() {
            return Err(LevelError::Occupied { row, col });
        }
        if self.sun < kind.cost() {
            return Err(LevelError::NotEnoughSun {
                needed: kind.cost(),
                available: self.sun,
            });
        }
        let remaining_ms = self.recharge_remaining(kind);
        if remaining_ms > 0 {
            return Err(LevelError::Recharging { kind, remaining_ms });
        }

        self.sun -= kind.cost();
        self.ready_at
            .insert(kind, self.elapsed_ms + kind.recharge_ms());
        self.lawn[row * COLUMNS + col] = Some(Plant::new(kind));
        debug!(kind = %kind, row, col, sun_left = self.sun, "Plant placed");
        Ok(())
    }

    /// Digs up the plant at `(row, col)`. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn dig_up(&mut self, row: usize, col: usize) -> bool {
        if row >= ROWS || col >= COLUMNS || self.outcome.is_some() {
            return false;
        }
        self.lawn[row * COLUMNS + col].take().is_some()
    }

    /// Ends the level at the player's request.
    #[instrument(skip(self))]
    pub fn surrender(&mut self) {
        if self.outcome.is_none() {
            info!(elapsed_ms = self.elapsed_ms, "Player surrendered");
            self.outcome = Some(LevelOutcome::Surrendered);
        }
    }

    /// Advances the simulation by `dt_ms` milliseconds.
    pub fn update(&mut self, dt_ms: u64) {
        let mut remaining = dt_ms;
        while remaining > 0 && self.outcome.is_none() {
            let step = remaining.min(MAX_STEP_MS);
            self.step(step);
            remaining -= step;
        }
    }

    fn step(&mut self, dt_ms: u64) {
        self.elapsed_ms += dt_ms;
        self.release_waves();
        self.drop_sky_sun();
        self.run_plants(dt_ms);
        self.fly_peas(dt_ms);
        self.move_zombies(dt_ms);
        self.collect_dead();
        self.check_breaches();
        self.check_cleared();
    }

    fn release_waves(&mut self) {
        while let Some(wave) = self.config.waves.get(self.next_wave) {
            if u64::from(wave.at_seconds) * 1000 > self.elapsed_ms {
                break;
            }
            info!(
                wave = self.next_wave + 1,
                zombies = wave.spawns.len(),
                elapsed_ms = self.elapsed_ms,
                "Wave released"
            );
            self.zombies
                .extend(wave.spawns.iter().map(|s| Zombie::spawn(s.kind, s.row)));
            self.next_wave += 1;
        }
    }

    fn drop_sky_sun(&mut self) {
        if self.config.sky_sun_seconds == 0 {
            return;
        }
        while self.elapsed_ms >= self.next_sky_sun_ms {
            self.sun += SUNFLOWER_YIELD;
            self.next_sky_sun_ms += u64::from(self.config.sky_sun_seconds) * 1000;
        }
    }

    fn run_plants(&mut self, dt_ms: u64) {
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let in_sight = self.zombies.iter().any(|z| {
                    *z.row() == row && *z.x() >= col as f32 && *z.x() < COLUMNS as f32
                });
                let Some(plant) = self.lawn[row * COLUMNS + col].as_mut() else {
                    continue;
                };
                match plant.step(dt_ms, in_sight) {
                    PlantAction::Idle => {}
                    PlantAction::ProduceSun => self.sun += SUNFLOWER_YIELD,
                    PlantAction::Shoot => {
                        let chill_ms = if *plant.kind() == PlantKind::SnowPea {
                            SNOW_PEA_CHILL_MS
                        } else {
                            0
                        };
                        self.peas.push(Pea {
                            row,
                            x: col as f32 + 0.5,
                            chill_ms,
                        });
                    }
                }
            }
        }
    }

    fn fly_peas(&mut self, dt_ms: u64) {
        let travel = PEA_SPEED * dt_ms as f32 / 1000.0;
        let zombies = &mut self.zombies;
        self.peas.retain_mut(|pea| {
            let from = pea.x;
            pea.x += travel;
            let target = zombies
                .iter_mut()
                .filter(|z| {
                    *z.row() == pea.row && !z.is_dead() && *z.x() <= pea.x && *z.x() + 1.0 > from
                })
                .min_by(|a, b| a.x().total_cmp(b.x()));
            match target {
                Some(zombie) => {
                    zombie.take_hit(PEA_DAMAGE, pea.chill_ms);
                    false
                }
                None => pea.x <= COLUMNS as f32 + 1.0,
            }
        });
    }

    fn move_zombies(&mut self, dt_ms: u64) {
        let bite = i32::try_from(i64::from(BITE_DPS) * dt_ms as i64 / 1000).unwrap_or(i32::MAX);
        for zombie in &mut self.zombies {
            zombie.thaw(dt_ms);
            let x = *zombie.x();
            let col = x.floor();
            let eating = if col >= 0.0 && (col as usize) < COLUMNS && x - col <= BITE_REACH {
                let idx = *zombie.row() * COLUMNS + col as usize;
                match self.lawn[idx].as_mut() {
                    Some(plant) => {
                        plant.bite(bite);
                        if plant.is_eaten() {
                            debug!(row = *zombie.row(), col = col as usize, "Plant eaten");
                            self.lawn[idx] = None;
                        }
                        true
                    }
                    None => false,
                }
            } else {
                false
            };
            if !eating {
                zombie.walk(dt_ms);
            }
        }
    }

    fn collect_dead(&mut self) {
        let kills = &mut self.kills;
        self.zombies.retain(|z| {
            if z.is_dead() {
                debug!(kind = %z.kind(), row = *z.row(), "Zombie defeated");
                kills.record(*z.kind());
                false
            } else {
                true
            }
        });
    }

    fn check_breaches(&mut self) {
        let breached: Vec<usize> = self
            .zombies
            .iter()
            .filter(|z| *z.x() < 0.0)
            .map(|z| *z.row())
            .collect();
        for row in breached {
            if self.mowers[row] {
                info!(row, "Lawn mower triggered");
                self.mowers[row] = false;
                for zombie in self.zombies.iter_mut().filter(|z| *z.row() == row) {
                    zombie.flatten();
                }
                self.collect_dead();
            } else if self.zombies.iter().any(|z| *z.row() == row && *z.x() < 0.0) {
                warn!(row, elapsed_ms = self.elapsed_ms, "Zombie reached the house");
                self.outcome = Some(LevelOutcome::Overrun);
                return;
            }
        }
    }

    fn check_cleared(&mut self) {
        if self.outcome.is_none() && self.waves_remaining() == 0 && self.zombies.is_empty() {
            info!(
                elapsed_ms = self.elapsed_ms,
                score = self.kills.score(),
                "Level cleared"
            );
            self.outcome = Some(LevelOutcome::Cleared);
        }
    }
}
