//! Economy ledger boundary.
//!
//! Withdrawal is the commit point of a promotion: the engine only advances a
//! grade after the ledger has accepted the withdrawal.

use guildhall_shared::PlayerId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Interface to the host's currency ledger.
pub trait EconomyLedger: Send + Sync {
    /// Current balance.
    fn balance(&self, player: PlayerId) -> i64;

    /// Removes `amount`. Returns `false` (and changes nothing) when refused.
    fn withdraw(&self, player: PlayerId, amount: i64) -> bool;

    /// Adds `amount`. Returns `false` when refused.
    fn deposit(&self, player: PlayerId, amount: i64, reason: &str) -> bool;
}

/// In-memory [`EconomyLedger`].
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: Mutex<HashMap<PlayerId, i64>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a balance.
    pub fn set_balance(&self, player: PlayerId, amount: i64) {
        self.balances.lock().insert(player, amount);
    }
}

impl EconomyLedger for MemoryLedger {
    fn balance(&self, player: PlayerId) -> i64 {
        self.balances.lock().get(&player).copied().unwrap_or(0)
    }

    fn withdraw(&self, player: PlayerId, amount: i64) -> bool {
        if amount < 0 {
            return false;
        }
        let mut balances = self.balances.lock();
        let balance = balances.entry(player).or_insert(0);
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    fn deposit(&self, player: PlayerId, amount: i64, _reason: &str) -> bool {
        if amount < 0 {
            return false;
        }
        let mut balances = self.balances.lock();
        let balance = balances.entry(player).or_insert(0);
        *balance = balance.saturating_add(amount);
        true
    }
}
