//! # Grade Service
//!
//! Promotion state machine for one job class. Grades only move forward, one
//! step per promotion; admins may set any grade within the job's cap.
//!
//! ```text
//! Grade 1 ──promote──> Grade 2 ──promote──> Grade 3 ──promote──> Grade 4
//!                                                    (Tier-2 stops here)
//! ```
//!
//! A promotion is checked in a fixed order (job held, grade cap, level,
//! currency, job-specific requirements) and the first failure is reported.
//! The ledger withdrawal is the commit point: if it is refused, the record
//! is not touched.

use guildhall_shared::{Grade, JobClass, JobEvent, PlayerId};
use std::fmt;
use tracing::{debug, info, warn};

use crate::bonus::GradeBonus;
use crate::context::EngineContext;
use crate::error::{JobError, JobResult};
use crate::profile::RequirementContext;
use crate::store::ProgressionRecord;

/// Why a promotion cannot happen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromotionBlocker {
    /// The player does not hold the job.
    NoJob,
    /// Already at the job's top grade.
    MaxGrade(Grade),
    /// Level below the target grade's requirement.
    LevelTooLow {
        /// Level required.
        required: u32,
        /// Current level.
        current: u32,
    },
    /// Balance below the target grade's cost.
    InsufficientFunds {
        /// Cost of the promotion.
        required: i64,
        /// Current balance.
        available: i64,
    },
    /// A job-specific requirement failed.
    Requirement(String),
}

impl fmt::Display for PromotionBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoJob => f.write_str("job not held"),
            Self::MaxGrade(grade) => write!(f, "already at the top grade ({grade})"),
            Self::LevelTooLow { required, current } => write!(
                f,
                "requires level {required}, currently level {current} ({} short)",
                required.saturating_sub(*current)
            ),
            Self::InsufficientFunds {
                required,
                available,
            } => write!(
                f,
                "requires {required} currency, has {available} ({} short)",
                required.saturating_sub(*available)
            ),
            Self::Requirement(message) => f.write_str(message),
        }
    }
}

/// Result of [`GradeService::can_promote`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionCheck {
    /// Whether a promotion would currently succeed.
    pub allowed: bool,
    /// Current grade (`Grade::First` when the job is not held).
    pub current: Grade,
    /// Grade a promotion would move to.
    pub target: Option<Grade>,
    /// Level the target requires.
    pub required_level: u32,
    /// Currency the target costs.
    pub cost: i64,
    /// First failed precondition.
    pub blocker: Option<PromotionBlocker>,
}

impl PromotionCheck {
    fn blocked(current: Grade, target: Option<Grade>, blocker: PromotionBlocker) -> Self {
        Self {
            allowed: false,
            current,
            target,
            required_level: 0,
            cost: 0,
            blocker: Some(blocker),
        }
    }

    /// Human-readable reason; empty when allowed.
    #[must_use]
    pub fn reason(&self) -> String {
        self.blocker
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// The target grade, or the blocker as an error.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::PromotionBlocked`] when not allowed.
    pub fn ensure(&self) -> JobResult<Grade> {
        match (&self.blocker, self.target) {
            (None, Some(target)) => Ok(target),
            (Some(blocker), _) => Err(JobError::PromotionBlocked(blocker.clone())),
            (None, None) => Err(JobError::PromotionBlocked(PromotionBlocker::MaxGrade(
                self.current,
            ))),
        }
    }
}

/// Result of [`GradeService::promote`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionResult {
    /// Whether the grade advanced.
    pub success: bool,
    /// Grade before the call.
    pub old_grade: Grade,
    /// Grade after the call (unchanged on failure).
    pub new_grade: Grade,
    /// Currency withdrawn.
    pub paid: i64,
    /// Outcome description.
    pub message: String,
}

impl PromotionResult {
    fn failed(grade: Grade, message: String) -> Self {
        Self {
            success: false,
            old_grade: grade,
            new_grade: grade,
            paid: 0,
            message,
        }
    }
}

/// Grade operations for one job class.
#[derive(Clone, Debug)]
pub struct GradeService {
    job: JobClass,
    ctx: EngineContext,
}

impl GradeService {
    /// Creates the service for `job`.
    #[must_use]
    pub fn new(job: JobClass, ctx: EngineContext) -> Self {
        Self { job, ctx }
    }

    /// The job class served.
    #[must_use]
    pub const fn job(&self) -> JobClass {
        self.job
    }

    /// `(required_level, cost)` for promoting into `target`.
    #[must_use]
    pub fn requirement(&self, target: Grade) -> (u32, i64) {
        self.ctx.rules.profiles().get(self.job).requirement_for(target)
    }

    /// Whether the player could be promoted right now. Pure read.
    #[must_use]
    pub fn can_promote(&self, player: PlayerId) -> PromotionCheck {
        let record = self.ctx.record(player, self.job);
        self.evaluate(player, record)
    }

    fn evaluate(&self, player: PlayerId, record: Option<ProgressionRecord>) -> PromotionCheck {
        let Some(record) = record else {
            return PromotionCheck::blocked(Grade::First, None, PromotionBlocker::NoJob);
        };
        let current = record.grade;
        let target = match current.next() {
            Some(next) if next <= self.job.max_grade() => next,
            _ => return PromotionCheck::blocked(current, None, PromotionBlocker::MaxGrade(current)),
        };

        let profiles = self.ctx.rules.profiles();
        let profile = profiles.get(self.job);
        let (required_level, cost) = profile.requirement_for(target);
        let mut check = PromotionCheck {
            allowed: false,
            current,
            target: Some(target),
            required_level,
            cost,
            blocker: None,
        };

        if record.level < required_level {
            check.blocker = Some(PromotionBlocker::LevelTooLow {
                required: required_level,
                current: record.level,
            });
            return check;
        }

        let available = self.ctx.ledger.balance(player);
        if available < cost {
            check.blocker = Some(PromotionBlocker::InsufficientFunds {
                required: cost,
                available,
            });
            return check;
        }

        let ctx = RequirementContext {
            sales: self.ctx.store.sales(player, self.job),
            catalog_count: self.ctx.store.catalog_count(player),
        };
        if let Some(message) = profile
            .requirements_for(target)
            .find_map(|req| req.check(&ctx).err())
        {
            check.blocker = Some(PromotionBlocker::Requirement(message));
            return check;
        }

        check.allowed = true;
        check
    }

    /// Advances the grade by one step, withdrawing its cost.
    ///
    /// Eligibility is re-checked under the player's lock. If the ledger
    /// refuses the withdrawal the grade is left unchanged.
    pub fn promote(&self, player: PlayerId) -> PromotionResult {
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();

        let record = self.ctx.record(player, self.job);
        let check = self.evaluate(player, record);
        let (record, target) = match (record, check.ensure()) {
            (Some(record), Ok(target)) => (record, target),
            (_, Err(err)) => {
                debug!(player, job = %self.job, reason = %err, "promotion refused");
                return PromotionResult::failed(check.current, check.reason());
            }
            (None, Ok(_)) => {
                return PromotionResult::failed(check.current, PromotionBlocker::NoJob.to_string())
            }
        };

        if check.cost > 0 && !self.ctx.ledger.withdraw(player, check.cost) {
            let err = JobError::WithdrawalFailed { amount: check.cost };
            warn!(player, job = %self.job, error = %err, "promotion aborted");
            return PromotionResult::failed(record.grade, err.to_string());
        }

        self.ctx.store.save_record(
            player,
            self.job,
            ProgressionRecord {
                grade: target,
                ..record
            },
        );

        let bonuses = self.ctx.rules.bonuses().get_bonus(self.job, target).describe();
        info!(
            player,
            job = %self.job,
            old_grade = %record.grade,
            new_grade = %target,
            paid = check.cost,
            "promoted"
        );
        self.ctx.events.emit(JobEvent::GradeUp {
            player,
            job: self.job,
            old_grade: record.grade,
            new_grade: target,
            bonuses,
        });

        PromotionResult {
            success: true,
            old_grade: record.grade,
            new_grade: target,
            paid: check.cost,
            message: format!("promoted to {} {target}", self.job),
        }
    }

    /// Admin: sets the grade directly, clamped to `1..=max_grade`. No cost,
    /// no level check, no event.
    ///
    /// Returns `false` if the player does not hold the job.
    pub fn set_grade(&self, player: PlayerId, grade: i64) -> bool {
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        let Some(record) = self.ctx.record(player, self.job) else {
            return false;
        };
        let grade = Grade::clamped(grade, self.job.max_grade());
        self.ctx
            .store
            .save_record(player, self.job, ProgressionRecord { grade, ..record });
        info!(player, job = %self.job, grade = %grade, "grade set");
        true
    }

    /// Current grade, if the job is held.
    #[must_use]
    pub fn grade(&self, player: PlayerId) -> Option<Grade> {
        self.ctx.record(player, self.job).map(|r| r.grade)
    }

    /// Active bonus; identity without the job.
    #[must_use]
    pub fn bonus(&self, player: PlayerId) -> GradeBonus {
        self.grade(player).map_or(GradeBonus::IDENTITY, |grade| {
            self.ctx.rules.bonuses().get_bonus(self.job, grade)
        })
    }

    /// Human-readable list of the active bonus.
    #[must_use]
    pub fn bonus_descriptions(&self, player: PlayerId) -> Vec<String> {
        self.bonus(player).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ExperienceCurve;
    use crate::ledger::{EconomyLedger, MemoryLedger};
    use crate::rules::Rules;
    use crate::sink::BufferedSink;
    use crate::store::{MemoryPlayerStore, PlayerStore};
    use std::sync::Arc;

    struct Fixture {
        service: GradeService,
        store: Arc<MemoryPlayerStore>,
        ledger: Arc<MemoryLedger>,
        events: Arc<BufferedSink>,
    }

    fn fixture(job: JobClass, level: u32, balance: i64) -> Fixture {
        let store = Arc::new(MemoryPlayerStore::new());
        let ledger = Arc::new(MemoryLedger::new());
        let events = Arc::new(BufferedSink::new());
        let ctx = EngineContext::new(
            Arc::new(Rules::new()),
            store.clone(),
            ledger.clone(),
            events.clone(),
        );
        store.save_record(
            1,
            job,
            ProgressionRecord {
                level,
                experience: ExperienceCurve::default().cumulative_exp_for_level(level),
                grade: Grade::First,
            },
        );
        ledger.set_balance(1, balance);
        Fixture {
            service: GradeService::new(job, ctx),
            store,
            ledger,
            events,
        }
    }

    #[test]
    fn test_level_checked_before_currency() {
        let f = fixture(JobClass::Miner, 19, 50_000);
        let check = f.service.can_promote(1);
        assert!(!check.allowed);
        assert_eq!(check.target, Some(Grade::Second));
        assert!(matches!(
            check.blocker,
            Some(PromotionBlocker::LevelTooLow {
                required: 20,
                current: 19
            })
        ));
        assert!(check.reason().contains("level"), "{}", check.reason());
    }

    #[test]
    fn test_insufficient_funds_reports_shortfall() {
        let f = fixture(JobClass::Miner, 20, 4_000);
        let check = f.service.can_promote(1);
        assert_eq!(
            check.blocker,
            Some(PromotionBlocker::InsufficientFunds {
                required: 10_000,
                available: 4_000
            })
        );
        assert!(check.reason().contains("6000 short"), "{}", check.reason());
    }

    #[test]
    fn test_promote_withdraws_and_emits() {
        let f = fixture(JobClass::Miner, 25, 12_000);
        let result = f.service.promote(1);
        assert!(result.success, "{}", result.message);
        assert_eq!((result.old_grade, result.new_grade), (Grade::First, Grade::Second));
        assert_eq!(result.paid, 10_000);
        assert_eq!(f.ledger.balance(1), 2_000);
        assert_eq!(f.service.grade(1), Some(Grade::Second));

        let events = f.events.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            JobEvent::GradeUp {
                new_grade: Grade::Second,
                ..
            }
        ));

        // Level 25 is below the third grade's 40.
        assert!(!f.service.promote(1).success);
        assert_eq!(f.ledger.balance(1), 2_000);
    }

    #[test]
    fn test_tier_two_stops_at_third_grade() {
        let f = fixture(JobClass::Artisan, 70, 0);
        assert!(f.service.set_grade(1, 3));
        let check = f.service.can_promote(1);
        assert_eq!(check.blocker, Some(PromotionBlocker::MaxGrade(Grade::Third)));
        assert!(check.ensure().is_err());
    }

    #[test]
    fn test_no_job() {
        let f = fixture(JobClass::Miner, 1, 0);
        let check = f.service.can_promote(2);
        assert_eq!(check.blocker, Some(PromotionBlocker::NoJob));
        let result = f.service.promote(2);
        assert!(!result.success);
        assert!(!f.service.set_grade(2, 2));
        assert_eq!(f.service.bonus(2), GradeBonus::IDENTITY);
    }

    #[test]
    fn test_set_grade_clamps() {
        let f = fixture(JobClass::Chef, 1, 0);
        assert!(f.service.set_grade(1, 9));
        assert_eq!(f.service.grade(1), Some(Grade::Third));
        assert!(f.service.set_grade(1, -3));
        assert_eq!(f.service.grade(1), Some(Grade::First));
        assert_eq!(f.store.record(1, JobClass::Chef).map(|r| r.level), Some(1));
    }
}
