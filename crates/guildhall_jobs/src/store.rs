//! # Player Store
//!
//! The aggregate player state the engine reads and writes: one
//! [`ProgressionRecord`] per held job, the catalog-registration counter and
//! per-job sales statistics.
//!
//! The engine requires last-writer-wins per field and read-your-writes within
//! one session. [`MemoryPlayerStore`] is the reference implementation; hosts
//! with a database put their own adapter behind [`PlayerStore`].

use guildhall_shared::{Grade, JobClass, PlayerId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::curve::ExperienceCurve;

/// Per-player, per-job progression state.
///
/// `level` is always derived from `experience` by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    /// Current level (1..=job cap).
    pub level: u32,
    /// Cumulative experience (0..=`MAX_EXP`).
    pub experience: i64,
    /// Current grade (1..=job cap).
    pub grade: Grade,
}

impl ProgressionRecord {
    /// A freshly granted job.
    #[must_use]
    pub const fn starting() -> Self {
        Self {
            level: 1,
            experience: 0,
            grade: Grade::First,
        }
    }

    /// Copy with `level` re-derived from `experience` under `curve`.
    ///
    /// A stored level goes stale when the curve is reloaded; read paths align
    /// the record before using its level.
    #[must_use]
    pub fn aligned(self, curve: &ExperienceCurve, cap: u32) -> Self {
        Self {
            level: curve.level_for_capped(self.experience, cap),
            ..self
        }
    }
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self::starting()
    }
}

/// Accumulated shop sales for one job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStats {
    /// Units sold.
    pub quantity: u64,
    /// Currency earned.
    pub earned: i64,
}

/// Interface to the host's player storage.
pub trait PlayerStore: Send + Sync {
    /// Progression record for a held job.
    fn record(&self, player: PlayerId, job: JobClass) -> Option<ProgressionRecord>;

    /// Creates or overwrites a record.
    fn save_record(&self, player: PlayerId, job: JobClass, record: ProgressionRecord);

    /// Deletes a record. Returns whether one existed.
    fn remove_record(&self, player: PlayerId, job: JobClass) -> bool;

    /// Jobs the player currently holds.
    fn held_jobs(&self, player: PlayerId) -> Vec<JobClass>;

    /// Number of catalog entries the player has registered.
    fn catalog_count(&self, player: PlayerId) -> u32;

    /// Sales statistics for one job.
    fn sales(&self, player: PlayerId, job: JobClass) -> SalesStats;

    /// Adds one sale to a job's statistics.
    fn record_sale(&self, player: PlayerId, job: JobClass, quantity: u64, earned: i64);
}

#[derive(Clone, Debug, Default)]
struct PlayerAggregate {
    records: HashMap<JobClass, ProgressionRecord>,
    catalog_count: u32,
    sales: HashMap<JobClass, SalesStats>,
}

/// In-memory [`PlayerStore`].
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    players: RwLock<HashMap<PlayerId, PlayerAggregate>>,
}

impl MemoryPlayerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a player's catalog-registration counter.
    pub fn set_catalog_count(&self, player: PlayerId, count: u32) {
        self.players.write().entry(player).or_default().catalog_count = count;
    }

    /// Number of players with any state.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.read().len()
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn record(&self, player: PlayerId, job: JobClass) -> Option<ProgressionRecord> {
        self.players
            .read()
            .get(&player)
            .and_then(|p| p.records.get(&job).copied())
    }

    fn save_record(&self, player: PlayerId, job: JobClass, record: ProgressionRecord) {
        self.players
            .write()
            .entry(player)
            .or_default()
            .records
            .insert(job, record);
    }

    fn remove_record(&self, player: PlayerId, job: JobClass) -> bool {
        self.players
            .write()
            .get_mut(&player)
            .is_some_and(|p| p.records.remove(&job).is_some())
    }

    fn held_jobs(&self, player: PlayerId) -> Vec<JobClass> {
        let mut jobs: Vec<JobClass> = self
            .players
            .read()
            .get(&player)
            .map(|p| p.records.keys().copied().collect())
            .unwrap_or_default();
        jobs.sort_unstable();
        jobs
    }

    fn catalog_count(&self, player: PlayerId) -> u32 {
        self.players
            .read()
            .get(&player)
            .map_or(0, |p| p.catalog_count)
    }

    fn sales(&self, player: PlayerId, job: JobClass) -> SalesStats {
        self.players
            .read()
            .get(&player)
            .and_then(|p| p.sales.get(&job).copied())
            .unwrap_or_default()
    }

    fn record_sale(&self, player: PlayerId, job: JobClass, quantity: u64, earned: i64) {
        let mut players = self.players.write();
        let stats = players
            .entry(player)
            .or_default()
            .sales
            .entry(job)
            .or_default();
        stats.quantity = stats.quantity.saturating_add(quantity);
        stats.earned = stats.earned.saturating_add(earned);
    }
}
