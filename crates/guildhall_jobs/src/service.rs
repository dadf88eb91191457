//! # Job Service
//!
//! Front door for job selection and everything a UI or telemetry layer asks
//! about a player's jobs. Numeric work is delegated to the per-job services
//! reached through the [`JobRegistry`].
//!
//! ## Tier rules
//!
//! ```text
//! Tier-1: Miner | Farmer | Fisher | Herbalist     at most one held
//! Tier-2: Chef | Artisan | Engineer               at most one held,
//!                                                 requires a Tier-1 job
//! ```

use guildhall_shared::{Grade, JobClass, JobEvent, PlayerId, Tier};
use tracing::{debug, info};

use crate::bonus::GradeBonus;
use crate::context::EngineContext;
use crate::error::{JobError, JobResult};
use crate::experience::ExperienceService;
use crate::grade::{GradeService, PromotionCheck, PromotionResult};
use crate::registry::JobRegistry;
use crate::store::ProgressionRecord;
use crate::unlock::UnlockStatus;

/// Read model of one held job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobSummary {
    /// Job class.
    pub job: JobClass,
    /// Its tier.
    pub tier: Tier,
    /// Current level.
    pub level: u32,
    /// Level cap.
    pub max_level: u32,
    /// Current experience.
    pub experience: i64,
    /// Experience still needed for the next level (0 at the cap).
    pub exp_to_next: i64,
    /// Fraction of the current level completed.
    pub progress: f64,
    /// Current grade.
    pub grade: Grade,
    /// Grade cap.
    pub max_grade: Grade,
    /// Active bonus.
    pub bonus: GradeBonus,
}

/// Orchestrates job selection, removal and read models.
#[derive(Clone, Debug)]
pub struct JobService {
    registry: JobRegistry,
}

impl JobService {
    /// Service over every job class.
    #[must_use]
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            registry: JobRegistry::new(ctx),
        }
    }

    /// Service over an explicitly built registry.
    #[must_use]
    pub const fn with_registry(registry: JobRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    fn ctx(&self) -> &EngineContext {
        self.registry.context()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Player-initiated selection. Enforces tier occupancy, the Tier-2
    /// prerequisite and unlock rules, in that order.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`], [`JobError::JobAlreadyHeld`],
    /// [`JobError::TierOccupied`], [`JobError::MissingPrerequisiteTier`] or
    /// [`JobError::UnlockDenied`]. Nothing is written on error.
    pub fn select_job(&self, player: PlayerId, job: JobClass) -> JobResult<()> {
        self.assign(player, job, true)
    }

    /// Admin grant. Skips unlock rules and the Tier-2 prerequisite but still
    /// allows only one job per tier.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`], [`JobError::JobAlreadyHeld`] or
    /// [`JobError::TierOccupied`].
    pub fn grant_job(&self, player: PlayerId, job: JobClass) -> JobResult<()> {
        self.assign(player, job, false)
    }

    fn assign(&self, player: PlayerId, job: JobClass, gated: bool) -> JobResult<()> {
        if !self.registry.is_registered(job) {
            return Err(JobError::UnknownJob(job));
        }
        let ctx = self.ctx();
        let lock = ctx.locks.handle(player);
        let _guard = lock.lock();

        let unlock_ctx = self.registry.unlock_context(player);
        let held = &unlock_ctx.held_jobs;
        let refused = if held.contains(&job) {
            Some(JobError::JobAlreadyHeld(job))
        } else if let Some(&other) = held.iter().find(|j| j.tier() == job.tier()) {
            Some(JobError::TierOccupied {
                tier: job.tier(),
                held: other,
            })
        } else if gated && job.tier() == Tier::Two && !held.iter().any(|j| j.tier() == Tier::One) {
            Some(JobError::MissingPrerequisiteTier(job))
        } else if gated {
            ctx.rules
                .unlocks()
                .first_failure(job, &unlock_ctx)
                .map(|message| JobError::UnlockDenied { job, message })
        } else {
            None
        };
        if let Some(err) = refused {
            debug!(player, job = %job, error = %err, "job selection refused");
            return Err(err);
        }

        ctx.store.save_record(player, job, ProgressionRecord::starting());
        info!(player, job = %job, granted = !gated, "job selected");
        ctx.events.emit(JobEvent::JobSelected { player, job });
        Ok(())
    }

    /// Clears the player's record for `job`.
    ///
    /// # Errors
    ///
    /// [`JobError::JobNotHeld`] if the player does not hold it.
    pub fn remove_job(&self, player: PlayerId, job: JobClass) -> JobResult<()> {
        let ctx = self.ctx();
        let lock = ctx.locks.handle(player);
        let _guard = lock.lock();
        if !ctx.store.remove_record(player, job) {
            return Err(JobError::JobNotHeld(job));
        }
        info!(player, job = %job, "job removed");
        Ok(())
    }

    /// Jobs the player holds.
    #[must_use]
    pub fn held_jobs(&self, player: PlayerId) -> Vec<JobClass> {
        self.ctx().store.held_jobs(player)
    }

    /// The job the player holds in `tier`, if any.
    #[must_use]
    pub fn job_in_tier(&self, player: PlayerId, tier: Tier) -> Option<JobClass> {
        self.held_jobs(player).into_iter().find(|j| j.tier() == tier)
    }

    /// Whether the player passes every unlock rule for `job`.
    #[must_use]
    pub fn can_unlock(&self, player: PlayerId, job: JobClass) -> bool {
        self.registry.can_unlock(player, job)
    }

    /// Each unlock rule for `job` with its current outcome.
    #[must_use]
    pub fn unlock_status(&self, player: PlayerId, job: JobClass) -> Vec<UnlockStatus> {
        self.registry.unlock_status(player, job)
    }

    // ========================================================================
    // Delegation
    // ========================================================================

    /// Experience service for `job`.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn experience(&self, job: JobClass) -> JobResult<&ExperienceService> {
        self.registry.experience(job)
    }

    /// Grade service for `job`.
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn grade(&self, job: JobClass) -> JobResult<&GradeService> {
        self.registry.grade(job)
    }

    /// See [`ExperienceService::add_exp`].
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn add_exp(&self, player: PlayerId, job: JobClass, amount: i64) -> JobResult<u32> {
        Ok(self.experience(job)?.add_exp(player, amount))
    }

    /// See [`ExperienceService::grant_exp_for_action`].
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn grant_exp_for_action(
        &self,
        player: PlayerId,
        job: JobClass,
        action: &str,
        count: u32,
    ) -> JobResult<i64> {
        Ok(self.experience(job)?.grant_exp_for_action(player, action, count))
    }

    /// See [`GradeService::can_promote`].
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn can_promote(&self, player: PlayerId, job: JobClass) -> JobResult<PromotionCheck> {
        Ok(self.grade(job)?.can_promote(player))
    }

    /// See [`GradeService::promote`].
    ///
    /// # Errors
    ///
    /// [`JobError::UnknownJob`] if `job` is not registered.
    pub fn promote(&self, player: PlayerId, job: JobClass) -> JobResult<PromotionResult> {
        Ok(self.grade(job)?.promote(player))
    }

    // ========================================================================
    // Read models
    // ========================================================================

    /// Summary of one job, if held.
    #[must_use]
    pub fn summary(&self, player: PlayerId, job: JobClass) -> Option<JobSummary> {
        let ctx = self.ctx();
        let record = ctx.record(player, job)?;
        let curve = ctx.rules.curve();
        let at_cap = record.level >= job.max_level();
        let (exp_to_next, progress) = if at_cap {
            (0, 1.0)
        } else {
            (
                (curve.cumulative_exp_for_level(record.level + 1) - record.experience).max(0),
                curve.progress(record.level, record.experience),
            )
        };
        Some(JobSummary {
            job,
            tier: job.tier(),
            level: record.level,
            max_level: job.max_level(),
            experience: record.experience,
            exp_to_next,
            progress,
            grade: record.grade,
            max_grade: job.max_grade(),
            bonus: ctx.rules.bonuses().get_bonus(job, record.grade),
        })
    }

    /// Summaries of every held job, Tier-1 first.
    #[must_use]
    pub fn summaries(&self, player: PlayerId) -> Vec<JobSummary> {
        self.held_jobs(player)
            .into_iter()
            .filter_map(|job| self.summary(player, job))
            .collect()
    }

    /// Drops lock entries for players with no call in flight.
    pub fn prune_idle_locks(&self) -> usize {
        self.ctx().locks.prune_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::rules::Rules;
    use crate::sink::BufferedSink;
    use crate::store::MemoryPlayerStore;
    use crate::unlock::UnlockRuleConfig;
    use guildhall_shared::EventKind;
    use std::sync::Arc;

    fn service() -> (JobService, Arc<BufferedSink>, Arc<MemoryPlayerStore>) {
        let events = Arc::new(BufferedSink::new());
        let store = Arc::new(MemoryPlayerStore::new());
        let ctx = EngineContext::new(
            Arc::new(Rules::new()),
            store.clone(),
            Arc::new(MemoryLedger::new()),
            events.clone(),
        );
        (JobService::new(ctx), events, store)
    }

    #[test]
    fn test_one_job_per_tier() {
        let (jobs, events, _) = service();
        jobs.select_job(1, JobClass::Miner).unwrap();

        let err = jobs.select_job(1, JobClass::Farmer).unwrap_err();
        assert_eq!(
            err,
            JobError::TierOccupied {
                tier: Tier::One,
                held: JobClass::Miner
            }
        );
        assert!(err.to_string().contains("already has a job in this tier"));
        assert_eq!(
            jobs.select_job(1, JobClass::Miner),
            Err(JobError::JobAlreadyHeld(JobClass::Miner))
        );

        jobs.select_job(1, JobClass::Chef).unwrap();
        assert_eq!(jobs.held_jobs(1), vec![JobClass::Miner, JobClass::Chef]);
        assert_eq!(jobs.job_in_tier(1, Tier::Two), Some(JobClass::Chef));

        let kinds: Vec<EventKind> = events.drain().iter().map(JobEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::JobSelected, EventKind::JobSelected]);
    }

    #[test]
    fn test_tier_two_needs_tier_one() {
        let (jobs, _, _) = service();
        assert_eq!(
            jobs.select_job(1, JobClass::Engineer),
            Err(JobError::MissingPrerequisiteTier(JobClass::Engineer))
        );
        assert!(jobs.held_jobs(1).is_empty());

        jobs.grant_job(1, JobClass::Engineer).unwrap();
        assert_eq!(jobs.held_jobs(1), vec![JobClass::Engineer]);
        assert!(jobs.grant_job(1, JobClass::Artisan).is_err());
    }

    #[test]
    fn test_unlock_rules_gate_selection_only() {
        let (jobs, _, store) = service();
        jobs.registry()
            .context()
            .rules
            .reload_unlocks(&[UnlockRuleConfig::CatalogCount {
                job: JobClass::Fisher,
                min: 5,
            }])
            .unwrap();

        match jobs.select_job(1, JobClass::Fisher) {
            Err(JobError::UnlockDenied { job, message }) => {
                assert_eq!(job, JobClass::Fisher);
                assert!(message.contains("5 catalog entries"), "{message}");
            }
            other => panic!("expected unlock denial, got {other:?}"),
        }
        assert!(!jobs.unlock_status(1, JobClass::Fisher)[0].passed);

        store.set_catalog_count(1, 5);
        jobs.select_job(1, JobClass::Fisher).unwrap();

        jobs.grant_job(2, JobClass::Fisher).unwrap();
    }

    #[test]
    fn test_remove_job() {
        let (jobs, _, _) = service();
        jobs.select_job(1, JobClass::Herbalist).unwrap();
        jobs.remove_job(1, JobClass::Herbalist).unwrap();
        assert_eq!(
            jobs.remove_job(1, JobClass::Herbalist),
            Err(JobError::JobNotHeld(JobClass::Herbalist))
        );
        jobs.select_job(1, JobClass::Farmer).unwrap();
    }

    #[test]
    fn test_summaries() {
        let (jobs, _, _) = service();
        jobs.select_job(1, JobClass::Miner).unwrap();
        jobs.add_exp(1, JobClass::Miner, 165).unwrap();

        let summaries = jobs.summaries(1);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!((s.level, s.experience, s.exp_to_next), (2, 165, 85));
        assert_eq!(s.max_level, 100);
        assert_eq!(s.grade, Grade::First);
        assert!(s.bonus.is_identity());
        assert!(jobs.summary(1, JobClass::Chef).is_none());
    }

    #[test]
    fn test_unregistered_job_is_rejected() {
        let registry = JobRegistry::with_jobs(EngineContext::in_memory(), &[JobClass::Miner]);
        let jobs = JobService::with_registry(registry);
        assert_eq!(
            jobs.select_job(1, JobClass::Farmer),
            Err(JobError::UnknownJob(JobClass::Farmer))
        );
        assert!(jobs.promote(1, JobClass::Farmer).is_err());
    }
}
