//! Lawn defense game domain: plants, zombies, levels and session results.

mod info;
mod kills;
mod level;
mod plant;
mod zombie;

/// Number of lawn rows.
pub const ROWS: usize = 5;
/// Number of lawn columns.
pub const COLUMNS: usize = 9;

pub use info::{GameInfo, PlayerIdentity};
pub use kills::KillTally;
pub use level::{Level, LevelConfig, LevelError, LevelOutcome, Pea, Spawn, Wave};
pub use plant::{Plant, PlantKind};
pub use zombie::{Zombie, ZombieKind};
