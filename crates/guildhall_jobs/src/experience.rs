//! # Experience Service
//!
//! Owns the experience/level pair of one job class. Level is never stored
//! independently: every write re-derives it from the experience curve, so
//! `level == curve.level_for(experience)` holds after each mutation.
//!
//! ```text
//! add_exp(player, 60)
//!   ├─ lock player
//!   ├─ load curve + bonuses snapshots
//!   ├─ scaled = round(60 × xp_multiplier), floored at 60 if ≤ 0
//!   ├─ experience = clamp(experience + scaled, 0, MAX_EXP)
//!   ├─ level = curve.level_for_capped(experience, job cap)
//!   └─ level rose? ──> LevelUp event
//! ```

use guildhall_shared::{JobClass, JobEvent, PlayerId};
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::curve::clamp_exp;
use crate::store::ProgressionRecord;

/// Outcome of one experience grant, internal to the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExpGain {
    /// Experience actually added after multiplier and clamping.
    pub added: i64,
    /// New level when the grant crossed a threshold.
    pub new_level: Option<u32>,
}

/// Experience and level operations for one job class.
#[derive(Clone, Debug)]
pub struct ExperienceService {
    job: JobClass,
    ctx: EngineContext,
}

impl ExperienceService {
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

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Adds experience, applying the current grade's multiplier.
    ///
    /// Returns the new level if the grant caused a level-up, otherwise 0.
    /// Non-positive amounts and players without the job are ignored.
    pub fn add_exp(&self, player: PlayerId, amount: i64) -> u32 {
        if amount <= 0 {
            debug!(player, job = %self.job, amount, "ignoring non-positive experience");
            return 0;
        }
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        self.add_exp_held(player, amount).new_level.unwrap_or(0)
    }

    /// [`Self::add_exp`] for callers already holding the player's lock.
    pub(crate) fn add_exp_held(&self, player: PlayerId, amount: i64) -> ExpGain {
        if amount <= 0 {
            return ExpGain::default();
        }
        let Some(record) = self.ctx.store.record(player, self.job) else {
            debug!(player, job = %self.job, "experience for a job the player does not hold");
            return ExpGain::default();
        };

        let curve = self.ctx.rules.curve();
        let record = record.aligned(&curve, self.job.max_level());
        let bonus = self.ctx.rules.bonuses().get_bonus(self.job, record.grade);

        let mut scaled = (amount as f64 * bonus.xp_multiplier).round() as i64;
        if scaled <= 0 {
            scaled = amount;
        }

        let experience = clamp_exp(record.experience.saturating_add(scaled));
        let level = curve.level_for_capped(experience, self.job.max_level());
        self.ctx.store.save_record(
            player,
            self.job,
            ProgressionRecord {
                level,
                experience,
                grade: record.grade,
            },
        );

        let added = experience - record.experience;
        if level > record.level {
            info!(
                player,
                job = %self.job,
                old_level = record.level,
                new_level = level,
                "level up"
            );
            self.ctx.events.emit(JobEvent::LevelUp {
                player,
                job: self.job,
                old_level: record.level,
                new_level: level,
            });
            ExpGain {
                added,
                new_level: Some(level),
            }
        } else {
            ExpGain {
                added,
                new_level: None,
            }
        }
    }

    /// Admin: overwrites experience (clamped) and re-derives the level.
    ///
    /// Returns `false` if the player does not hold the job.
    pub fn set_exp(&self, player: PlayerId, experience: i64) -> bool {
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        let Some(record) = self.ctx.record(player, self.job) else {
            return false;
        };
        let experience = clamp_exp(experience);
        let level = self
            .ctx
            .rules
            .curve()
            .level_for_capped(experience, self.job.max_level());
        self.ctx.store.save_record(
            player,
            self.job,
            ProgressionRecord {
                level,
                experience,
                grade: record.grade,
            },
        );
        info!(player, job = %self.job, experience, level, "experience set");
        true
    }

    /// Admin: overwrites the level (clamped) and sets experience to that
    /// level's threshold.
    ///
    /// Returns `false` if the player does not hold the job.
    pub fn set_level(&self, player: PlayerId, level: u32) -> bool {
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        let Some(record) = self.ctx.record(player, self.job) else {
            return false;
        };
        let level = level.clamp(1, self.job.max_level());
        let experience = self.ctx.rules.curve().cumulative_exp_for_level(level);
        self.ctx.store.save_record(
            player,
            self.job,
            ProgressionRecord {
                level,
                experience,
                grade: record.grade,
            },
        );
        info!(player, job = %self.job, experience, level, "level set");
        true
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    /// Grants the configured reward for `count` repetitions of `action`.
    ///
    /// Returns the experience added (0 for unknown actions or non-holders).
    pub fn grant_exp_for_action(&self, player: PlayerId, action: &str, count: u32) -> i64 {
        let reward = self.ctx.rules.profiles().get(self.job).action_reward(action, count);
        if reward <= 0 {
            return 0;
        }
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        self.add_exp_held(player, reward).added
    }

    /// Grants experience for selling `count` units of `item` for
    /// `sale_amount` currency.
    ///
    /// Returns the experience added.
    pub fn add_sale_exp_from_shop(
        &self,
        player: PlayerId,
        item: &str,
        count: u32,
        sale_amount: i64,
    ) -> i64 {
        let lock = self.ctx.locks.handle(player);
        let _guard = lock.lock();
        self.sale_exp_held(player, item, count, sale_amount).added
    }

    pub(crate) fn sale_exp_held(
        &self,
        player: PlayerId,
        item: &str,
        count: u32,
        sale_amount: i64,
    ) -> ExpGain {
        let reward = self
            .ctx
            .rules
            .profiles()
            .get(self.job)
            .sale_exp(item, count, sale_amount);
        self.add_exp_held(player, reward)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current level, or 0 without the job.
    #[must_use]
    pub fn level(&self, player: PlayerId) -> u32 {
        self.ctx.record(player, self.job).map_or(0, |r| r.level)
    }

    /// Current experience, or 0 without the job.
    #[must_use]
    pub fn experience(&self, player: PlayerId) -> i64 {
        self.ctx
            .store
            .record(player, self.job)
            .map_or(0, |r| r.experience)
    }

    /// Experience still needed for the next level; 0 at the cap or without
    /// the job.
    #[must_use]
    pub fn exp_to_next_level(&self, player: PlayerId) -> i64 {
        let Some(record) = self.ctx.record(player, self.job) else {
            return 0;
        };
        if record.level >= self.job.max_level() {
            return 0;
        }
        let next = self.ctx.rules.curve().cumulative_exp_for_level(record.level + 1);
        (next - record.experience).max(0)
    }

    /// Fraction of the current level completed, in `[0, 1]`; 1.0 at the cap,
    /// 0.0 without the job.
    #[must_use]
    pub fn level_progress(&self, player: PlayerId) -> f64 {
        let Some(record) = self.ctx.record(player, self.job) else {
            return 0.0;
        };
        if record.level >= self.job.max_level() {
            return 1.0;
        }
        self.ctx.rules.curve().progress(record.level, record.experience)
    }

    /// Whether the player sits at the job's level cap.
    #[must_use]
    pub fn is_max_level(&self, player: PlayerId) -> bool {
        self.ctx
            .record(player, self.job)
            .is_some_and(|r| r.level >= self.job.max_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::GradeBonusEntry;
    use crate::curve::MAX_EXP;
    use crate::ledger::MemoryLedger;
    use crate::profile::JobProfile;
    use crate::rules::Rules;
    use crate::sink::BufferedSink;
    use crate::store::{MemoryPlayerStore, PlayerStore};
    use guildhall_shared::{EventKind, Grade};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct Fixture {
        service: ExperienceService,
        store: Arc<MemoryPlayerStore>,
        events: Arc<BufferedSink>,
        rules: Arc<Rules>,
    }

    fn fixture(job: JobClass) -> Fixture {
        let rules = Arc::new(Rules::new());
        let store = Arc::new(MemoryPlayerStore::new());
        let events = Arc::new(BufferedSink::new());
        let ctx = EngineContext::new(
            Arc::clone(&rules),
            store.clone(),
            Arc::new(MemoryLedger::new()),
            events.clone(),
        );
        store.save_record(1, job, ProgressionRecord::starting());
        Fixture {
            service: ExperienceService::new(job, ctx),
            store,
            events,
            rules,
        }
    }

    #[test]
    fn test_first_level_up() {
        let f = fixture(JobClass::Miner);
        assert_eq!(f.service.add_exp(1, 109), 0);
        assert_eq!(f.service.add_exp(1, 1), 2);
        assert_eq!(f.service.experience(1), 110);

        let events = f.events.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::LevelUp);
    }

    #[test]
    fn test_rejects_non_positive_and_non_holders() {
        let f = fixture(JobClass::Miner);
        assert_eq!(f.service.add_exp(1, 0), 0);
        assert_eq!(f.service.add_exp(1, -50), 0);
        assert_eq!(f.service.add_exp(2, 500), 0);
        assert_eq!(f.service.experience(1), 0);
        assert_eq!(f.store.record(2, JobClass::Miner), None);
    }

    #[test]
    fn test_clamps_at_ceiling() {
        let f = fixture(JobClass::Miner);
        f.service.add_exp(1, MAX_EXP * 2);
        assert_eq!(f.service.experience(1), MAX_EXP);
        assert_eq!(f.service.level(1), 100);
        assert!(f.service.is_max_level(1));
        assert_eq!(f.service.exp_to_next_level(1), 0);
        assert!((f.service.level_progress(1) - 1.0).abs() < f64::EPSILON);

        f.service.add_exp(1, i64::MAX);
        assert_eq!(f.service.experience(1), MAX_EXP);
    }

    #[test]
    fn test_tier_two_truncates_at_seventy() {
        let f = fixture(JobClass::Chef);
        f.service.add_exp(1, MAX_EXP);
        assert_eq!(f.service.level(1), 70);
        assert!(f.service.is_max_level(1));
    }

    #[test]
    fn test_grade_multiplier_applies() {
        let f = fixture(JobClass::Fisher);
        f.rules
            .reload_bonuses(&[GradeBonusEntry {
                job: JobClass::Fisher,
                grade: Grade::Second,
                yield_multiplier: 1.0,
                seed_multiplier: 1.0,
                xp_multiplier: 1.5,
                prime_chance_bonus: 0.0,
                trophy_chance_bonus: 0.0,
                rare_chance_bonus: 0.0,
                lure_bonus: 0,
                mining_efficiency: 0,
            }])
            .unwrap();
        f.store.save_record(
            1,
            JobClass::Fisher,
            ProgressionRecord {
                grade: Grade::Second,
                ..ProgressionRecord::starting()
            },
        );
        f.service.add_exp(1, 100);
        assert_eq!(f.service.experience(1), 150);
        assert_eq!(f.rules.bonuses().len(), 1);
    }

    #[test]
    fn test_admin_paths_rederive() {
        let f = fixture(JobClass::Miner);
        assert!(f.service.set_level(1, 3));
        assert_eq!(f.service.experience(1), 110 + 140);

        assert!(f.service.set_exp(1, 109));
        assert_eq!(f.service.level(1), 1);

        assert!(f.service.set_level(1, 500));
        assert_eq!(f.service.level(1), 100);

        assert!(f.service.set_exp(1, -5));
        assert_eq!(f.service.experience(1), 0);
        assert_eq!(f.service.level(1), 1);

        assert!(!f.service.set_exp(9, 10));
        assert!(f.events.drain().is_empty());
    }

    #[test]
    fn test_progress_reads() {
        let f = fixture(JobClass::Miner);
        f.service.add_exp(1, 55);
        assert_eq!(f.service.exp_to_next_level(1), 55);
        assert!((f.service.level_progress(1) - 0.5).abs() < 1e-9);
        assert!(!f.service.is_max_level(1));
        assert!(f.service.level_progress(2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reward_tables() {
        let f = fixture(JobClass::Miner);
        let mut jobs = HashMap::new();
        let mut miner = JobProfile {
            sale_exp_ratio: 0.1,
            ..JobProfile::default()
        };
        miner.action_rewards.insert("iron_ore".into(), 12);
        jobs.insert("miner".to_string(), miner);
        f.rules
            .reload_profiles(crate::profile::JobProfiles::from_map(&jobs).unwrap());

        assert_eq!(f.service.grant_exp_for_action(1, "iron_ore", 5), 60);
        assert_eq!(f.service.grant_exp_for_action(1, "dirt", 5), 0);
        assert_eq!(f.service.add_sale_exp_from_shop(1, "coal", 10, 400), 40);
        assert_eq!(f.service.experience(1), 100);
    }
}
