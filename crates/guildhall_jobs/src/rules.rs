//! # Live Rules
//!
//! Every reloadable table behind its own [`Snapshot`]. An operation loads
//! the snapshots it needs once and computes against those `Arc`s, so a
//! concurrent reload can never hand it a torn mix of old and new values.
//!
//! Reloads validate first and swap second. A rejected table is logged and
//! reported; the previous one keeps serving.

use std::sync::Arc;
use tracing::{info, warn};

use crate::bonus::{GradeBonusEntry, GradeBonusTable};
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::EngineConfig;
use crate::curve::{ExperienceCurve, ExperienceSegment};
use crate::error::{JobError, JobResult};
use crate::pricing::PricingRules;
use crate::profile::JobProfiles;
use crate::snapshot::Snapshot;
use crate::unlock::{UnlockRuleConfig, UnlockRules};

/// Configuration section names, as they appear in reports and logs.
pub mod section {
    /// `[experience]`
    pub const EXPERIENCE: &str = "experience";
    /// `[pricing]`
    pub const PRICING: &str = "pricing";
    /// `[[grade_bonus]]`
    pub const GRADE_BONUS: &str = "grade_bonus";
    /// `[jobs.*]`
    pub const JOBS: &str = "jobs";
    /// `[[unlock]]`
    pub const UNLOCK: &str = "unlock";
    /// `[[catalog]]`
    pub const CATALOG: &str = "catalog";
}

/// Outcome of [`Rules::apply`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReloadReport {
    /// Sections swapped in.
    pub applied: Vec<&'static str>,
    /// Sections refused, with the reason. Their previous values stay live.
    pub rejected: Vec<(&'static str, JobError)>,
}

impl ReloadReport {
    /// Whether every present section was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// The engine's reloadable state.
#[derive(Debug, Default)]
pub struct Rules {
    curve: Snapshot<ExperienceCurve>,
    bonuses: Snapshot<GradeBonusTable>,
    pricing: Snapshot<PricingRules>,
    unlocks: Snapshot<UnlockRules>,
    profiles: Snapshot<JobProfiles>,
    catalog: Snapshot<Catalog>,
}

impl Rules {
    /// Built-in defaults: default curve and pricing, no bonuses, no unlock
    /// rules, default profiles, empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds rules from a configuration, failing on the first bad section.
    ///
    /// # Errors
    ///
    /// Returns the first section's validation error.
    pub fn from_config(config: &EngineConfig) -> JobResult<Self> {
        let rules = Self::new();
        let report = rules.apply(config);
        match report.rejected.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(rules),
        }
    }

    /// Current experience curve.
    #[inline]
    #[must_use]
    pub fn curve(&self) -> Arc<ExperienceCurve> {
        self.curve.load()
    }

    /// Current grade bonus table.
    #[inline]
    #[must_use]
    pub fn bonuses(&self) -> Arc<GradeBonusTable> {
        self.bonuses.load()
    }

    /// Current pricing multipliers.
    #[inline]
    #[must_use]
    pub fn pricing(&self) -> Arc<PricingRules> {
        self.pricing.load()
    }

    /// Current unlock rules.
    #[inline]
    #[must_use]
    pub fn unlocks(&self) -> Arc<UnlockRules> {
        self.unlocks.load()
    }

    /// Current job profiles.
    #[inline]
    #[must_use]
    pub fn profiles(&self) -> Arc<JobProfiles> {
        self.profiles.load()
    }

    /// Current item catalog.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.load()
    }

    /// Validates and swaps in new curve segments.
    ///
    /// Stored levels are not rewritten; readers re-derive them from
    /// experience under the new curve through
    /// [`EngineContext::record`](crate::EngineContext::record).
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`]; the current curve stays live.
    pub fn reload_curve(&self, segments: &[ExperienceSegment]) -> JobResult<()> {
        let curve = Self::checked(section::EXPERIENCE, ExperienceCurve::from_segments(segments))?;
        info!(
            top = curve.cumulative_exp_for_level(curve.max_level()),
            "experience curve swapped"
        );
        self.curve.replace(curve);
        Ok(())
    }

    /// Validates and swaps in a new bonus table.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`]; the current table stays live.
    pub fn reload_bonuses(&self, entries: &[GradeBonusEntry]) -> JobResult<()> {
        let table = Self::checked(section::GRADE_BONUS, GradeBonusTable::from_entries(entries))?;
        info!(rows = table.len(), "grade bonus table swapped");
        self.bonuses.replace(table);
        Ok(())
    }

    /// Validates and swaps in new pricing multipliers.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`]; the current multipliers stay live.
    pub fn reload_pricing(&self, pricing: PricingRules) -> JobResult<()> {
        let pricing = Self::checked(section::PRICING, pricing.validated())?;
        info!(
            level_bonus_percent = pricing.level_bonus_percent,
            no_job_sell = pricing.no_job_sell_multiplier,
            no_job_buy = pricing.no_job_buy_multiplier,
            "pricing swapped"
        );
        self.pricing.replace(pricing);
        Ok(())
    }

    /// Validates and swaps in new unlock rules.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`]; the current rules stay live.
    pub fn reload_unlocks(&self, configs: &[UnlockRuleConfig]) -> JobResult<()> {
        let unlocks = Self::checked(section::UNLOCK, UnlockRules::from_configs(configs))?;
        info!(rules = configs.len(), "unlock rules swapped");
        self.unlocks.replace(unlocks);
        Ok(())
    }

    /// Swaps in already-validated profiles.
    pub fn reload_profiles(&self, profiles: JobProfiles) {
        info!("job profiles swapped");
        self.profiles.replace(profiles);
    }

    /// Validates and swaps in a new catalog.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`]; the current catalog stays live.
    pub fn reload_catalog(&self, entries: &[CatalogEntry]) -> JobResult<()> {
        let catalog = Self::checked(section::CATALOG, Catalog::from_entries(entries))?;
        info!(items = catalog.len(), "catalog swapped");
        self.catalog.replace(catalog);
        Ok(())
    }

    /// Applies every section present in `config`, each independently.
    pub fn apply(&self, config: &EngineConfig) -> ReloadReport {
        let mut report = ReloadReport::default();
        let mut record = |name: &'static str, outcome: JobResult<()>| match outcome {
            Ok(()) => report.applied.push(name),
            Err(err) => report.rejected.push((name, err)),
        };

        if let Some(experience) = &config.experience {
            record(section::EXPERIENCE, self.reload_curve(&experience.segments));
        }
        if let Some(pricing) = config.pricing {
            record(section::PRICING, self.reload_pricing(pricing));
        }
        if let Some(rows) = &config.grade_bonus {
            record(section::GRADE_BONUS, self.reload_bonuses(rows));
        }
        if let Some(jobs) = &config.jobs {
            let outcome = Self::checked(section::JOBS, JobProfiles::from_map(jobs))
                .map(|profiles| self.reload_profiles(profiles));
            record(section::JOBS, outcome);
        }
        if let Some(rules) = &config.unlock {
            record(section::UNLOCK, self.reload_unlocks(rules));
        }
        if let Some(items) = &config.catalog {
            record(section::CATALOG, self.reload_catalog(items));
        }
        report
    }

    fn checked<T>(name: &'static str, built: JobResult<T>) -> JobResult<T> {
        built.map_err(|err| {
            warn!(section = name, error = %err, "configuration rejected, keeping previous");
            err
        })
    }
}
