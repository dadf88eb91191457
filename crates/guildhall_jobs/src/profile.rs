//! # Job Profiles
//!
//! Per-job strategy data: experience reward tables, grade requirement
//! overrides and extra promotion requirements. Every job runs through the
//! same [`ExperienceService`](crate::ExperienceService) and
//! [`GradeService`](crate::GradeService); what differs between jobs lives
//! here, so adding a job is a data change.
//!
//! ```toml
//! [jobs.miner]
//! sale_exp_ratio = 0.1
//!
//! [jobs.miner.action_rewards]
//! iron_ore = 12
//!
//! [[jobs.miner.requirements]]
//! kind = "min_sales"
//! from_grade = 3
//! count = 500
//! ```

use guildhall_shared::{Grade, JobClass};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{JobError, JobResult};
use crate::store::SalesStats;

/// Required level and cost override for one target grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRequirement {
    /// Grade being promoted into.
    pub grade: Grade,
    /// Minimum level.
    pub required_level: u32,
    /// Currency withdrawn on promotion.
    pub cost: i64,
}

/// What extra requirements can inspect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequirementContext {
    /// Lifetime sales in this job.
    pub sales: SalesStats,
    /// Catalog entries registered.
    pub catalog_count: u32,
}

/// An extra predicate a promotion must pass, from `from_grade` onward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionRequirement {
    /// Items of this job sold.
    MinSales {
        /// First target grade the requirement applies to.
        from_grade: Grade,
        /// Items required.
        count: u64,
    },
    /// Currency earned from this job's sales.
    MinEarnings {
        /// First target grade the requirement applies to.
        from_grade: Grade,
        /// Currency required.
        amount: i64,
    },
    /// Catalog entries registered.
    MinCatalog {
        /// First target grade the requirement applies to.
        from_grade: Grade,
        /// Entries required.
        count: u32,
    },
}

impl PromotionRequirement {
    /// Whether promoting into `target` is subject to this requirement.
    #[must_use]
    pub fn applies(&self, target: Grade) -> bool {
        let from = match *self {
            Self::MinSales { from_grade, .. }
            | Self::MinEarnings { from_grade, .. }
            | Self::MinCatalog { from_grade, .. } => from_grade,
        };
        target >= from
    }

    /// Checks the requirement, returning the shortfall message on failure.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the requirement is not met.
    pub fn check(&self, ctx: &RequirementContext) -> Result<(), String> {
        match *self {
            Self::MinSales { count, .. } if ctx.sales.quantity < count => Err(format!(
                "sell {count} items first ({} sold)",
                ctx.sales.quantity
            )),
            Self::MinEarnings { amount, .. } if ctx.sales.earned < amount => Err(format!(
                "earn {amount} from sales first ({} earned)",
                ctx.sales.earned
            )),
            Self::MinCatalog { count, .. } if ctx.catalog_count < count => Err(format!(
                "register {count} catalog entries first ({} registered)",
                ctx.catalog_count
            )),
            _ => Ok(()),
        }
    }
}

/// Strategy record for one job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProfile {
    /// Experience per unit of a gameplay action (ore mined, fish caught).
    pub action_rewards: HashMap<String, i64>,
    /// Experience per unit sold, by item kind.
    pub sale_rewards: HashMap<String, i64>,
    /// Fallback: experience per currency earned for items with no entry in
    /// `sale_rewards`.
    pub sale_exp_ratio: f64,
    /// Required level / cost overrides.
    pub grades: Vec<GradeRequirement>,
    /// Extra promotion predicates.
    pub requirements: Vec<PromotionRequirement>,
}

impl JobProfile {
    /// `(required_level, cost)` for promoting into `target`.
    #[must_use]
    pub fn requirement_for(&self, target: Grade) -> (u32, i64) {
        self.grades
            .iter()
            .find(|r| r.grade == target)
            .map_or(
                (target.default_required_level(), target.default_cost()),
                |r| (r.required_level, r.cost),
            )
    }

    /// Experience for `count` repetitions of an action; 0 when unknown.
    #[must_use]
    pub fn action_reward(&self, action: &str, count: u32) -> i64 {
        self.action_rewards
            .get(action)
            .map_or(0, |&per_unit| per_unit.saturating_mul(i64::from(count)))
    }

    /// Experience for selling `count` units that earned `sale_amount`.
    #[must_use]
    pub fn sale_exp(&self, item: &str, count: u32, sale_amount: i64) -> i64 {
        if let Some(&per_unit) = self.sale_rewards.get(item) {
            return per_unit.saturating_mul(i64::from(count));
        }
        if sale_amount <= 0 {
            return 0;
        }
        (sale_amount as f64 * self.sale_exp_ratio).round() as i64
    }

    /// Requirements that gate promotion into `target`, in order.
    pub fn requirements_for(&self, target: Grade) -> impl Iterator<Item = &PromotionRequirement> {
        self.requirements.iter().filter(move |r| r.applies(target))
    }

    fn validate(&self, job: JobClass) -> JobResult<()> {
        for (kind, table) in [("action", &self.action_rewards), ("sale", &self.sale_rewards)] {
            if let Some((key, value)) = table.iter().find(|(_, v)| **v < 0) {
                return Err(JobError::InvalidConfig(format!(
                    "{job}: {kind} reward {key} is negative ({value})"
                )));
            }
        }
        if !self.sale_exp_ratio.is_finite() || self.sale_exp_ratio < 0.0 {
            return Err(JobError::InvalidConfig(format!(
                "{job}: sale_exp_ratio must be a non-negative number"
            )));
        }

        let mut previous_level = 0;
        for target in Grade::ALL.into_iter().skip(1) {
            if target > job.max_grade() {
                if self.grades.iter().any(|r| r.grade == target) {
                    return Err(JobError::InvalidConfig(format!(
                        "{job} tops out at {}, requirement given for {target}",
                        job.max_grade()
                    )));
                }
                continue;
            }
            let (level, cost) = self.requirement_for(target);
            if level > job.max_level() {
                return Err(JobError::InvalidConfig(format!(
                    "{job}: {target} requires level {level}, above the cap {}",
                    job.max_level()
                )));
            }
            if cost < 0 {
                return Err(JobError::InvalidConfig(format!(
                    "{job}: {target} has negative cost {cost}"
                )));
            }
            if level < previous_level {
                return Err(JobError::InvalidConfig(format!(
                    "{job}: {target} requires a lower level than the grade before it"
                )));
            }
            previous_level = level;
        }

        if let Some(r) = self.requirements.iter().find(|r| {
            matches!(r, PromotionRequirement::MinEarnings { amount, .. } if *amount < 0)
        }) {
            return Err(JobError::InvalidConfig(format!(
                "{job}: negative earnings requirement {r:?}"
            )));
        }
        Ok(())
    }
}

/// One profile per job class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobProfiles {
    profiles: [JobProfile; 7],
}

impl JobProfiles {
    /// Every job on the default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds profiles from a `jobs.<key>` table; unlisted jobs use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] for unknown job keys or an invalid
    /// profile.
    pub fn from_map(map: &HashMap<String, JobProfile>) -> JobResult<Self> {
        let mut profiles = Self::default();
        for (key, profile) in map {
            let job = JobClass::from_str(key).map_err(|e| JobError::InvalidConfig(e.to_string()))?;
            profile.validate(job)?;
            profiles.profiles[job as usize] = profile.clone();
        }
        Ok(profiles)
    }

    /// Sets one job's profile.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] if the profile is invalid for `job`.
    pub fn set(&mut self, job: JobClass, profile: JobProfile) -> JobResult<()> {
        profile.validate(job)?;
        self.profiles[job as usize] = profile;
        Ok(())
    }

    /// Profile for `job`.
    #[inline]
    #[must_use]
    pub fn get(&self, job: JobClass) -> &JobProfile {
        &self.profiles[job as usize]
    }
}
