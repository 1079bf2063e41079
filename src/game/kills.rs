//! Per-kind kill bookkeeping for one game session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{instrument, warn};

use crate::game::ZombieKind;

/// Kill counts per zombie kind.
///
/// Serializes as a `{ "normal": 3, "conehead": 1 }` style map, the same shape
/// the leaderboard service accepts in a score submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KillTally {
    counts: BTreeMap<ZombieKind, u32>,
}

impl KillTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single kill.
    pub fn record(&mut self, kind: ZombieKind) {
        self.add(kind, 1);
    }

    /// Records `count` kills of `kind`.
    pub fn add(&mut self, kind: ZombieKind, count: u32) {
        *self.counts.entry(kind).or_insert(0) += count;
    }

    /// Kills recorded for `kind`.
    pub fn count(&self, kind: ZombieKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Total kills across all kinds.
    #[instrument(skip(self))]
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Total score contribution: the sum of `count * score_value` per kind.
    #[instrument(skip(self))]
    pub fn score(&self) -> u32 {
        self.counts
            .iter()
            .map(|(kind, count)| count * kind.score_value())
            .sum()
    }

    /// Kinds with at least one kill, in kind order.
    pub fn entries(&self) -> impl Iterator<Item = (ZombieKind, u32)> + '_ {
        ZombieKind::iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
    }

    /// Whether nothing was killed.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Converts to the wire map keyed by zombie type name.
    #[instrument(skip(self))]
    pub fn to_wire(&self) -> BTreeMap<String, i32> {
        self.entries()
            .map(|(kind, count)| {
                let count = i32::try_from(count).unwrap_or_else(|_| {
                    warn!(kind = %kind, count, "Kill count exceeds wire range, clamping");
                    i32::MAX
                });
                (kind.wire_name().to_string(), count)
            })
            .collect()
    }
}

impl FromIterator<(ZombieKind, u32)> for KillTally {
    fn from_iter<T: IntoIterator<Item = (ZombieKind, u32)>>(iter: T) -> Self {
        let mut tally = Self::new();
        for (kind, count) in iter {
            tally.add(kind, count);
        }
        tally
    }
}
