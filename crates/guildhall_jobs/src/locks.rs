//! Per-player mutual exclusion.
//!
//! Every mutation of one player's progression runs inside that player's
//! lock, so two overlapping events for the same player cannot both read the
//! old record. No code path holds two players' locks at once.
//!
//! ```rust,ignore
//! let lock = locks.handle(player);
//! let _guard = lock.lock();
//! // read-modify-write the player's record
//! ```

use guildhall_shared::PlayerId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to one player's lock.
pub type PlayerLock = Arc<Mutex<()>>;

/// Registry of per-player locks.
#[derive(Debug, Default)]
pub struct PlayerLocks {
    locks: Mutex<HashMap<PlayerId, PlayerLock>>,
}

impl PlayerLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `player`, creating it on first use.
    ///
    /// The registry lock is released before the caller locks the handle.
    #[must_use]
    pub fn handle(&self, player: PlayerId) -> PlayerLock {
        Arc::clone(self.locks.lock().entry(player).or_default())
    }

    /// Drops locks nobody is holding or waiting on. Returns how many.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of tracked players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no players are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
