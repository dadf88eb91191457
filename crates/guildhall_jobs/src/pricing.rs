//! # Pricing Policy
//!
//! **Compounding per-level prices**
//!
//! ```text
//! non-job item      : base
//! job not held      : round(base × no_job_sell)   / round(base × no_job_buy)
//! job held, level L : round(base × (1 + pct/100)^L)   (both directions)
//! ```
//!
//! Holders buy and sell at the same factor so a buy/sell round trip can
//! never make money. Each computation reads one [`PricingRules`] snapshot.

use guildhall_shared::{JobClass, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{JobError, JobResult};
use crate::rules::Rules;
use crate::store::PlayerStore;

/// Default per-level compounding bonus, in percent.
pub const DEFAULT_LEVEL_BONUS_PERCENT: f64 = 7.0;

/// Multipliers for a price computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    /// Per-level compounding bonus in percent (clamped to 0..=100).
    pub level_bonus_percent: f64,
    /// Sell multiplier for players without the item's job.
    pub no_job_sell_multiplier: f64,
    /// Buy multiplier for players without the item's job.
    pub no_job_buy_multiplier: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            level_bonus_percent: DEFAULT_LEVEL_BONUS_PERCENT,
            no_job_sell_multiplier: 0.6,
            no_job_buy_multiplier: 1.4,
        }
    }
}

/// How a player relates to the job owning an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceStanding {
    /// Item belongs to no job.
    NonJobItem,
    /// Player lacks the item's job.
    NoJob,
    /// Player holds the item's job at this level.
    Holder {
        /// Current level in that job.
        level: u32,
    },
}

impl PricingRules {
    /// Validates the multipliers and clamps the level bonus into 0..=100.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] for a non-finite level bonus,
    /// non-finite or negative multipliers, or a no-job sell multiplier above
    /// the no-job buy multiplier (which would let non-holders profit from
    /// buying and reselling).
    pub fn validated(self) -> JobResult<Self> {
        if !self.level_bonus_percent.is_finite() {
            return Err(JobError::InvalidConfig(format!(
                "pricing: level_bonus_percent must be finite, got {}",
                self.level_bonus_percent
            )));
        }
        let fields = [
            ("no_job_sell_multiplier", self.no_job_sell_multiplier),
            ("no_job_buy_multiplier", self.no_job_buy_multiplier),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(JobError::InvalidConfig(format!(
                    "pricing: {name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.no_job_sell_multiplier > self.no_job_buy_multiplier {
            return Err(JobError::InvalidConfig(format!(
                "pricing: no_job_sell_multiplier {} exceeds no_job_buy_multiplier {}",
                self.no_job_sell_multiplier, self.no_job_buy_multiplier
            )));
        }
        Ok(Self {
            level_bonus_percent: self.level_bonus_percent.clamp(0.0, 100.0),
            ..self
        })
    }

    /// `(1 + pct/100)^level`.
    #[inline]
    #[must_use]
    pub fn level_factor(&self, level: u32) -> f64 {
        let pct = self.level_bonus_percent.clamp(0.0, 100.0);
        (1.0 + pct / 100.0).powi(level.min(i32::MAX as u32) as i32)
    }

    /// Unit price a player receives when selling.
    #[must_use]
    pub fn sell_price(&self, base_price: i64, standing: PriceStanding) -> i64 {
        self.price(base_price, standing, self.no_job_sell_multiplier)
    }

    /// Unit price a player pays when buying.
    #[must_use]
    pub fn buy_price(&self, base_price: i64, standing: PriceStanding) -> i64 {
        self.price(base_price, standing, self.no_job_buy_multiplier)
    }

    fn price(&self, base_price: i64, standing: PriceStanding, no_job_multiplier: f64) -> i64 {
        if base_price <= 0 {
            return 0;
        }
        let base = base_price as f64;
        match standing {
            PriceStanding::NonJobItem => base_price,
            PriceStanding::NoJob => round_price(base * no_job_multiplier),
            PriceStanding::Holder { level } => round_price(base * self.level_factor(level)),
        }
    }
}

/// Rounds half away from zero; saturates at the `i64` range.
#[inline]
fn round_price(value: f64) -> i64 {
    value.round() as i64
}

/// Resolves a player's standing and prices against the live rules.
pub struct PricingPolicy {
    rules: Arc<Rules>,
    store: Arc<dyn PlayerStore>,
}

impl PricingPolicy {
    /// Creates a policy over shared rules and storage.
    #[must_use]
    pub fn new(rules: Arc<Rules>, store: Arc<dyn PlayerStore>) -> Self {
        Self { rules, store }
    }

    /// The player's standing for an item owned by `job`.
    #[must_use]
    pub fn standing(&self, player: PlayerId, job: Option<JobClass>) -> PriceStanding {
        match job {
            None => PriceStanding::NonJobItem,
            Some(job) => match self.store.record(player, job) {
                Some(record) => PriceStanding::Holder {
                    level: record.aligned(&self.rules.curve(), job.max_level()).level,
                },
                None => PriceStanding::NoJob,
            },
        }
    }

    /// Unit sell price for this player.
    #[must_use]
    pub fn sell_price(&self, player: PlayerId, base_price: i64, job: Option<JobClass>) -> i64 {
        let rules = self.rules.pricing();
        rules.sell_price(base_price, self.standing(player, job))
    }

    /// Unit buy price for this player.
    #[must_use]
    pub fn buy_price(&self, player: PlayerId, base_price: i64, job: Option<JobClass>) -> i64 {
        let rules = self.rules.pricing();
        rules.buy_price(base_price, self.standing(player, job))
    }
}
