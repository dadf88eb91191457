//! # Sell Service
//!
//! Turns a catalog sale into currency, experience and statistics.
//!
//! ```text
//! sell(player, "iron_ore", 16)
//!   ├─ validate amount, look up catalog entry
//!   ├─ lock player
//!   ├─ unit price from one pricing snapshot × amount
//!   ├─ ledger.deposit ──refused──> abort, no experience
//!   ├─ experience via the owning job (holders only)
//!   └─ record sales statistics for the owning job
//! ```

use guildhall_shared::PlayerId;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::error::{JobError, JobResult};
use crate::pricing::{PriceStanding, PricingPolicy};
use crate::registry::JobRegistry;

/// Reason string passed to the ledger on deposits.
pub const SALE_REASON: &str = "job shop sale";

/// Result of [`SellService::sell`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleResult {
    /// Whether currency was credited.
    pub success: bool,
    /// Currency credited.
    pub earned_currency: i64,
    /// Experience granted.
    pub earned_exp: i64,
    /// Outcome description.
    pub message: String,
}

impl SaleResult {
    fn failed(err: &JobError) -> Self {
        Self {
            success: false,
            earned_currency: 0,
            earned_exp: 0,
            message: err.to_string(),
        }
    }
}

/// Sale orchestration over the catalog and pricing policy.
pub struct SellService {
    registry: JobRegistry,
    pricing: PricingPolicy,
}

impl SellService {
    /// Service over every job class.
    #[must_use]
    pub fn new(ctx: EngineContext) -> Self {
        Self::with_registry(JobRegistry::new(ctx))
    }

    /// Service over an explicitly built registry.
    #[must_use]
    pub fn with_registry(registry: JobRegistry) -> Self {
        let ctx = registry.context();
        let pricing = PricingPolicy::new(Arc::clone(&ctx.rules), Arc::clone(&ctx.store));
        Self { registry, pricing }
    }

    /// Pricing policy used for quotes and sales.
    #[must_use]
    pub const fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Sells `amount` units of `item` on behalf of `player`.
    pub fn sell(&self, player: PlayerId, item: &str, amount: u32) -> SaleResult {
        match self.try_sell(player, item, amount) {
            Ok(result) => result,
            Err(err) => {
                debug!(player, item, amount, error = %err, "sale refused");
                SaleResult::failed(&err)
            }
        }
    }

    fn try_sell(&self, player: PlayerId, item: &str, amount: u32) -> JobResult<SaleResult> {
        if amount == 0 {
            return Err(JobError::NonPositiveAmount(0));
        }
        let ctx = self.registry.context();
        let catalog = ctx.rules.catalog();
        let entry = catalog
            .get(item)
            .ok_or_else(|| JobError::UnknownItem(item.to_string()))?;

        let lock = ctx.locks.handle(player);
        let _guard = lock.lock();

        let pricing = ctx.rules.pricing();
        let standing = self.pricing.standing(player, entry.job);
        let unit = pricing.sell_price(entry.base_price, standing);
        let total = unit.saturating_mul(i64::from(amount));

        if total > 0 && !ctx.ledger.deposit(player, total, SALE_REASON) {
            return Err(JobError::DepositFailed { amount: total });
        }

        let mut earned_exp = 0;
        if let Some(job) = entry.job {
            if let (PriceStanding::Holder { .. }, Ok(service)) =
                (standing, self.registry.experience(job))
            {
                earned_exp = service.sale_exp_held(player, item, amount, total).added;
            }
            ctx.store.record_sale(player, job, u64::from(amount), total);
        }

        info!(player, item, amount, earned = total, exp = earned_exp, "sale");
        Ok(SaleResult {
            success: true,
            earned_currency: total,
            earned_exp,
            message: format!("sold {amount} {item} for {total}"),
        })
    }

    /// What selling `amount` units would pay, without selling.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownItem`] if `item` is not in the catalog.
    pub fn quote_sell(&self, player: PlayerId, item: &str, amount: u32) -> JobResult<i64> {
        let catalog = self.registry.context().rules.catalog();
        let entry = catalog
            .get(item)
            .ok_or_else(|| JobError::UnknownItem(item.to_string()))?;
        let unit = self.pricing.sell_price(player, entry.base_price, entry.job);
        Ok(unit.saturating_mul(i64::from(amount)))
    }

    /// What buying `amount` units would cost.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownItem`] if `item` is not in the catalog.
    pub fn quote_buy(&self, player: PlayerId, item: &str, amount: u32) -> JobResult<i64> {
        let catalog = self.registry.context().rules.catalog();
        let entry = catalog
            .get(item)
            .ok_or_else(|| JobError::UnknownItem(item.to_string()))?;
        let unit = self.pricing.buy_price(player, entry.base_price, entry.job);
        Ok(unit.saturating_mul(i64::from(amount)))
    }
}
