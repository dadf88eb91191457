//! # Job Registry
//!
//! The directory from job class to its services. Built explicitly from an
//! [`EngineContext`] at startup and passed to whoever needs it; there is no
//! global instance.

use guildhall_shared::{JobClass, PlayerId};
use std::collections::HashMap;

use crate::context::EngineContext;
use crate::error::{JobError, JobResult};
use crate::experience::ExperienceService;
use crate::grade::GradeService;
use crate::unlock::{UnlockContext, UnlockStatus};

#[derive(Clone, Debug)]
struct JobEntry {
    experience: ExperienceService,
    grade: GradeService,
}

/// Services for every registered job class.
#[derive(Clone, Debug)]
pub struct JobRegistry {
    ctx: EngineContext,
    entries: HashMap<JobClass, JobEntry>,
}

impl JobRegistry {
    /// Registers every job class.
    #[must_use]
    pub fn new(ctx: EngineContext) -> Self {
        Self::with_jobs(ctx, &JobClass::ALL)
    }

    /// Registers only `jobs`; the others answer [`JobError::UnknownJob`].
    #[must_use]
    pub fn with_jobs(ctx: EngineContext, jobs: &[JobClass]) -> Self {
        let entries = jobs
            .iter()
            .map(|&job| {
                (
                    job,
                    JobEntry {
                        experience: ExperienceService::new(job, ctx.clone()),
                        grade: GradeService::new(job, ctx.clone()),
                    },
                )
            })
            .collect();
        Self { ctx, entries }
    }

    /// Shared handles.
    #[must_use]
    pub const fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Whether `job` is registered.
    #[must_use]
    pub fn is_registered(&self, job: JobClass) -> bool {
        self.entries.contains_key(&job)
    }

    /// Experience service for `job`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::UnknownJob`] if `job` is not registered.
    pub fn experience(&self, job: JobClass) -> JobResult<&ExperienceService> {
        self.entries
            .get(&job)
            .map(|e| &e.experience)
            .ok_or(JobError::UnknownJob(job))
    }

    /// Grade service for `job`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::UnknownJob`] if `job` is not registered.
    pub fn grade(&self, job: JobClass) -> JobResult<&GradeService> {
        self.entries
            .get(&job)
            .map(|e| &e.grade)
            .ok_or(JobError::UnknownJob(job))
    }

    /// Snapshot of the player state unlock rules look at.
    #[must_use]
    pub fn unlock_context(&self, player: PlayerId) -> UnlockContext {
        UnlockContext {
            player,
            catalog_count: self.ctx.store.catalog_count(player),
            balance: self.ctx.ledger.balance(player),
            held_jobs: self.ctx.store.held_jobs(player),
        }
    }

    /// Whether every unlock rule for `job` passes.
    #[must_use]
    pub fn can_unlock(&self, player: PlayerId, job: JobClass) -> bool {
        self.unlock_failure(player, job).is_none()
    }

    /// Message of the first failing unlock rule.
    #[must_use]
    pub fn unlock_failure(&self, player: PlayerId, job: JobClass) -> Option<String> {
        let ctx = self.unlock_context(player);
        self.ctx.rules.unlocks().first_failure(job, &ctx)
    }

    /// Every unlock rule for `job` with its current outcome.
    #[must_use]
    pub fn unlock_status(&self, player: PlayerId, job: JobClass) -> Vec<UnlockStatus> {
        let ctx = self.unlock_context(player);
        self.ctx.rules.unlocks().status(job, &ctx)
    }
}
