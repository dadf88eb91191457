//! Shared handles every service is constructed with.

use guildhall_shared::{JobClass, PlayerId};
use std::sync::Arc;

use crate::ledger::{EconomyLedger, MemoryLedger};
use crate::locks::PlayerLocks;
use crate::rules::Rules;
use crate::sink::{EventSink, NullSink};
use crate::store::{MemoryPlayerStore, PlayerStore, ProgressionRecord};

/// Rules, collaborators and the per-player lock registry.
///
/// Cloning is cheap; every clone points at the same state. Construct one at
/// startup and hand it to [`JobService::new`](crate::JobService::new) and
/// [`SellService::new`](crate::SellService::new).
#[derive(Clone)]
pub struct EngineContext {
    /// Live configuration.
    pub rules: Arc<Rules>,
    /// Aggregate player state.
    pub store: Arc<dyn PlayerStore>,
    /// Currency.
    pub ledger: Arc<dyn EconomyLedger>,
    /// Notifications.
    pub events: Arc<dyn EventSink>,
    /// Per-player mutual exclusion.
    pub locks: Arc<PlayerLocks>,
}

impl EngineContext {
    /// Wires the given collaborators with a fresh lock registry.
    #[must_use]
    pub fn new(
        rules: Arc<Rules>,
        store: Arc<dyn PlayerStore>,
        ledger: Arc<dyn EconomyLedger>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            rules,
            store,
            ledger,
            events,
            locks: Arc::new(PlayerLocks::new()),
        }
    }

    /// Default rules, in-memory store and ledger, events discarded.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(Rules::new()),
            Arc::new(MemoryPlayerStore::new()),
            Arc::new(MemoryLedger::new()),
            Arc::new(NullSink),
        )
    }

    /// A held job's record with its level re-derived from the live curve.
    #[must_use]
    pub fn record(&self, player: PlayerId, job: JobClass) -> Option<ProgressionRecord> {
        let record = self.store.record(player, job)?;
        Some(record.aligned(&self.rules.curve(), job.max_level()))
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("rules", &self.rules)
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}
