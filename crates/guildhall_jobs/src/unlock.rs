//! # Unlock Rules
//!
//! Predicates gating job selection. A job may carry any number of rules; all
//! must pass. Evaluation stops at the first failure and that rule's message
//! becomes the refusal reason.
//!
//! Rules are configured as tagged TOML tables:
//!
//! ```toml
//! [[unlock]]
//! kind = "catalog_count"
//! job = "chef"
//! min = 30
//! ```

use guildhall_shared::{JobClass, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{JobError, JobResult};

/// The slice of aggregate player state rules may look at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockContext {
    /// Player being evaluated.
    pub player: PlayerId,
    /// Catalog entries registered.
    pub catalog_count: u32,
    /// Currency balance.
    pub balance: i64,
    /// Jobs currently held.
    pub held_jobs: Vec<JobClass>,
}

/// A selection predicate.
pub trait UnlockRule: Send + Sync + fmt::Debug {
    /// Whether the player satisfies the rule.
    fn check(&self, ctx: &UnlockContext) -> bool;

    /// What the rule asks for, for display.
    fn description(&self) -> String;

    /// Why the player fails the rule.
    fn failure_message(&self, ctx: &UnlockContext) -> String;
}

/// Requires a minimum number of registered catalog entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogCountRule {
    /// Entries required.
    pub min: u32,
}

impl UnlockRule for CatalogCountRule {
    fn check(&self, ctx: &UnlockContext) -> bool {
        ctx.catalog_count >= self.min
    }

    fn description(&self) -> String {
        format!("Register {} catalog entries", self.min)
    }

    fn failure_message(&self, ctx: &UnlockContext) -> String {
        format!(
            "needs {} catalog entries, has {} ({} more)",
            self.min,
            ctx.catalog_count,
            self.min.saturating_sub(ctx.catalog_count)
        )
    }
}

/// Requires a minimum currency balance. Nothing is withdrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyRule {
    /// Balance required.
    pub min: i64,
}

impl UnlockRule for CurrencyRule {
    fn check(&self, ctx: &UnlockContext) -> bool {
        ctx.balance >= self.min
    }

    fn description(&self) -> String {
        format!("Hold at least {} currency", self.min)
    }

    fn failure_message(&self, ctx: &UnlockContext) -> String {
        format!(
            "needs {} currency, has {} ({} short)",
            self.min,
            ctx.balance,
            self.min.saturating_sub(ctx.balance)
        )
    }
}

/// Requires a specific job to be held already.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldsJobRule {
    /// Job required.
    pub required: JobClass,
}

impl UnlockRule for HoldsJobRule {
    fn check(&self, ctx: &UnlockContext) -> bool {
        ctx.held_jobs.contains(&self.required)
    }

    fn description(&self) -> String {
        format!("Work as a {}", self.required)
    }

    fn failure_message(&self, _ctx: &UnlockContext) -> String {
        format!("requires the {} job", self.required)
    }
}

/// One configured rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockRuleConfig {
    /// See [`CatalogCountRule`].
    CatalogCount {
        /// Job gated.
        job: JobClass,
        /// Entries required.
        min: u32,
    },
    /// See [`CurrencyRule`].
    Currency {
        /// Job gated.
        job: JobClass,
        /// Balance required.
        min: i64,
    },
    /// See [`HoldsJobRule`].
    HoldsJob {
        /// Job gated.
        job: JobClass,
        /// Job required.
        required: JobClass,
    },
}

impl UnlockRuleConfig {
    /// Job this rule gates.
    #[must_use]
    pub const fn job(&self) -> JobClass {
        match self {
            Self::CatalogCount { job, .. }
            | Self::Currency { job, .. }
            | Self::HoldsJob { job, .. } => *job,
        }
    }

    fn build(&self) -> JobResult<Arc<dyn UnlockRule>> {
        match *self {
            Self::CatalogCount { min, .. } => Ok(Arc::new(CatalogCountRule { min })),
            Self::Currency { job, min } => {
                if min < 0 {
                    return Err(JobError::InvalidConfig(format!(
                        "{job}: currency threshold cannot be negative"
                    )));
                }
                Ok(Arc::new(CurrencyRule { min }))
            }
            Self::HoldsJob { job, required } => {
                if job == required {
                    return Err(JobError::InvalidConfig(format!(
                        "{job} cannot require itself"
                    )));
                }
                Ok(Arc::new(HoldsJobRule { required }))
            }
        }
    }
}

/// Result of evaluating one rule, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockStatus {
    /// What the rule asks for.
    pub description: String,
    /// Whether it currently passes.
    pub passed: bool,
}

/// Rules for every job.
#[derive(Clone, Debug, Default)]
pub struct UnlockRules {
    by_job: HashMap<JobClass, Vec<Arc<dyn UnlockRule>>>,
}

impl UnlockRules {
    /// No rules: every job is freely selectable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds rules from configuration, preserving per-job order.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] for negative currency thresholds
    /// or a job that requires itself.
    pub fn from_configs(configs: &[UnlockRuleConfig]) -> JobResult<Self> {
        let mut by_job: HashMap<JobClass, Vec<Arc<dyn UnlockRule>>> = HashMap::new();
        for config in configs {
            by_job.entry(config.job()).or_default().push(config.build()?);
        }
        Ok(Self { by_job })
    }

    /// Adds a rule programmatically.
    pub fn push(&mut self, job: JobClass, rule: Arc<dyn UnlockRule>) {
        self.by_job.entry(job).or_default().push(rule);
    }

    /// Rules gating `job`, in evaluation order.
    #[must_use]
    pub fn rules_for(&self, job: JobClass) -> &[Arc<dyn UnlockRule>] {
        self.by_job.get(&job).map_or(&[][..], Vec::as_slice)
    }

    /// Message of the first failing rule, or `None` when all pass.
    #[must_use]
    pub fn first_failure(&self, job: JobClass, ctx: &UnlockContext) -> Option<String> {
        self.rules_for(job)
            .iter()
            .find(|rule| !rule.check(ctx))
            .map(|rule| rule.failure_message(ctx))
    }

    /// Every rule's description and current outcome.
    #[must_use]
    pub fn status(&self, job: JobClass, ctx: &UnlockContext) -> Vec<UnlockStatus> {
        self.rules_for(job)
            .iter()
            .map(|rule| UnlockStatus {
                description: rule.description(),
                passed: rule.check(ctx),
            })
            .collect()
    }
}
