//! Plant kinds and planted defenders.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::instrument;

/// Sun produced by one sunflower harvest.
pub const SUNFLOWER_YIELD: u32 = 25;

const SUNFLOWER_INTERVAL_MS: u64 = 24_000;
const SUNFLOWER_FIRST_HARVEST_MS: u64 = 7_000;
const SHOOTER_INTERVAL_MS: u64 = 1_500;

/// Seed packets available to the player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    /// Produces sun.
    #[display("Sunflower")]
    Sunflower,
    /// Shoots peas at zombies in its row.
    #[display("Peashooter")]
    Peashooter,
    /// Shoots frozen peas that slow zombies.
    #[display("Snow Pea")]
    SnowPea,
    /// Blocks zombies for a long time.
    #[display("Wall-nut")]
    WallNut,
}

impl PlantKind {
    /// Sun cost to plant.
    #[instrument]
    pub fn cost(self) -> u32 {
        match self {
            Self::Sunflower | Self::WallNut => 50,
            Self::Peashooter => 100,
            Self::SnowPea => 175,
        }
    }

    /// Starting hit points.
    pub fn health(self) -> i32 {
        match self {
            Self::WallNut => 4000,
            _ => 300,
        }
    }

    /// Time before the same seed packet can be planted again.
    pub fn recharge_ms(self) -> u64 {
        match self {
            Self::WallNut => 30_000,
            _ => 7_500,
        }
    }

    /// Single-character glyph used on the lawn.
    pub fn glyph(self) -> char {
        match self {
            Self::Sunflower => '*',
            Self::Peashooter => 'P',
            Self::SnowPea => 'S',
            Self::WallNut => 'W',
        }
    }

    /// Whether this plant fires peas.
    pub fn is_shooter(self) -> bool {
        matches!(self, Self::Peashooter | Self::SnowPea)
    }

    /// Looks up the seed packet bound to a number key (1-based).
    #[instrument]
    pub fn from_hotkey(digit: u32) -> Option<Self> {
        let index = usize::try_from(digit).ok()?.checked_sub(1)?;
        Self::iter().nth(index)
    }
}

/// A plant growing in one lawn cell.
#[derive(Debug, Clone, Getters)]
pub struct Plant {
    kind: PlantKind,
    health: i32,
    timer_ms: u64,
}

/// What a plant did during one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlantAction {
    Idle,
    ProduceSun,
    Shoot,
}

impl Plant {
    /// Plants a fresh seedling.
    #[instrument]
    pub fn new(kind: PlantKind) -> Self {
        let timer_ms = match kind {
            PlantKind::Sunflower => SUNFLOWER_INTERVAL_MS - SUNFLOWER_FIRST_HARVEST_MS,
            _ => 0,
        };
        Self {
            kind,
            health: kind.health(),
            timer_ms,
        }
    }

    /// Whether the plant has been eaten.
    pub fn is_eaten(&self) -> bool {
        self.health <= 0
    }

    pub(crate) fn bite(&mut self, damage: i32) {
        self.health -= damage;
    }

    /// Advances the plant's timer. Shooters only reload while a target is in sight.
    pub(crate) fn step(&mut self, dt_ms: u64, target_in_sight: bool) -> PlantAction {
        match self.kind {
            PlantKind::Sunflower => {
                self.timer_ms += dt_ms;
                if self.timer_ms >= SUNFLOWER_INTERVAL_MS {
                    self.timer_ms -= SUNFLOWER_INTERVAL_MS;
                    PlantAction::ProduceSun
                } else {
                    PlantAction::Idle
                }
            }
            PlantKind::Peashooter | PlantKind::SnowPea => {
                if !target_in_sight {
                    self.timer_ms = (self.timer_ms + dt_ms).min(SHOOTER_INTERVAL_MS);
                    return PlantAction::Idle;
                }
                self.timer_ms += dt_ms;
                if self.timer_ms >= SHOOTER_INTERVAL_MS {
                    self.timer_ms -= SHOOTER_INTERVAL_MS;
                    PlantAction::Shoot
                } else {
                    PlantAction::Idle
                }
            }
            PlantKind::WallNut => PlantAction::Idle,
        }
    }
}
