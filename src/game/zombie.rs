//! Zombie kinds and the zombies walking across the lawn.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use tracing::instrument;

use crate::game::COLUMNS;

/// Hit points below which a newspaper zombie has lost its paper and speeds up.
const NEWSPAPER_RAGE_THRESHOLD: i32 = 200;

/// Enemy types that can appear in a level.
///
/// The serialized (wire) name is the snake_case variant name, which is also
/// what the leaderboard stores in its kill-detail rows.
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
    EnumString,
    IntoStaticStr,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ZombieKind {
    /// Basic zombie.
    #[display("Zombie")]
    Normal,
    /// Wears a traffic cone.
    #[display("Conehead Zombie")]
    Conehead,
    /// Wears a bucket.
    #[display("Buckethead Zombie")]
    Buckethead,
    /// Leads a wave, walks a little faster.
    #[display("Flag Zombie")]
    Flag,
    /// Speeds up once its newspaper is destroyed.
    #[display("Newspaper Zombie")]
    Newspaper,
}

impl ZombieKind {
    /// Name used on the wire and in the database.
    pub fn wire_name(self) -> &'static str {
        self.into()
    }

    /// Points awarded for defeating one zombie of this kind.
    #[instrument]
    pub fn score_value(self) -> u32 {
        match self {
            Self::Normal => 10,
            Self::Flag => 15,
            Self::Conehead => 20,
            Self::Newspaper => 25,
            Self::Buckethead => 30,
        }
    }

    /// Starting hit points.
    pub fn health(self) -> i32 {
        match self {
            Self::Normal | Self::Flag => 200,
            Self::Newspaper => 340,
            Self::Conehead => 560,
            Self::Buckethead => 1300,
        }
    }

    /// Walking speed in lawn cells per second.
    pub fn speed(self) -> f32 {
        match self {
            Self::Flag => 0.3,
            _ => 0.22,
        }
    }

    /// Single-character glyph used on the lawn.
    pub fn glyph(self) -> char {
        match self {
            Self::Normal => 'z',
            Self::Conehead => 'c',
            Self::Buckethead => 'b',
            Self::Flag => 'f',
            Self::Newspaper => 'n',
        }
    }
}

/// A zombie on the lawn.
///
/// `x` is the zombie's left edge measured in cells from the house; a zombie
/// occupies `[x, x + 1)`.
#[derive(Debug, Clone, Getters)]
pub struct Zombie {
    kind: ZombieKind,
    row: usize,
    x: f32,
    health: i32,
    slowed_ms: u64,
}

impl Zombie {
    /// Spawns a zombie just off the right edge of the lawn.
    #[instrument]
    pub fn spawn(kind: ZombieKind, row: usize) -> Self {
        Self {
            kind,
            row,
            x: COLUMNS as f32,
            health: kind.health(),
            slowed_ms: 0,
        }
    }

    /// Current walking speed, accounting for chill and newspaper rage.
    pub fn current_speed(&self) -> f32 {
        let base = if self.kind == ZombieKind::Newspaper && self.health < NEWSPAPER_RAGE_THRESHOLD
        {
            0.45
        } else {
            self.kind.speed()
        };
        if self.slowed_ms > 0 { base * 0.5 } else { base }
    }

    /// Whether the zombie has been defeated.
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Applies damage, optionally chilling the zombie for `chill_ms`.
    pub fn take_hit(&mut self, damage: i32, chill_ms: u64) {
        self.health -= damage;
        self.slowed_ms = self.slowed_ms.max(chill_ms);
    }

    /// Walks left for `dt_ms` milliseconds.
    pub(crate) fn walk(&mut self, dt_ms: u64) {
        self.x -= self.current_speed() * dt_ms as f32 / 1000.0;
    }

    /// Counts down the chill effect.
    pub(crate) fn thaw(&mut self, dt_ms: u64) {
        self.slowed_ms = self.slowed_ms.saturating_sub(dt_ms);
    }

    /// Kills the zombie outright (lawn mower).
    pub(crate) fn flatten(&mut self) {
        self.health = 0;
    }
}
