//! # Grade Bonus Table
//!
//! Per-job, per-grade multipliers and flat bonuses. Missing entries resolve
//! to [`GradeBonus::IDENTITY`], so a job with no configured bonuses behaves
//! exactly like an unpromoted one.

use guildhall_shared::{Grade, JobClass};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{JobError, JobResult};

/// Bonuses granted by one grade of one job.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeBonus {
    /// Multiplier on gathered quantities.
    pub yield_multiplier: f64,
    /// Multiplier on seeds returned by harvests.
    pub seed_multiplier: f64,
    /// Multiplier on experience gained.
    pub xp_multiplier: f64,
    /// Added chance (0..=1) of a prime-quality result.
    pub prime_chance_bonus: f64,
    /// Added chance (0..=1) of a trophy catch.
    pub trophy_chance_bonus: f64,
    /// Added chance (0..=1) of a rare find.
    pub rare_chance_bonus: f64,
    /// Flat lure strength bonus.
    pub lure_bonus: i32,
    /// Flat mining speed bonus.
    pub mining_efficiency: i32,
}

impl GradeBonus {
    /// No bonus at all.
    pub const IDENTITY: Self = Self {
        yield_multiplier: 1.0,
        seed_multiplier: 1.0,
        xp_multiplier: 1.0,
        prime_chance_bonus: 0.0,
        trophy_chance_bonus: 0.0,
        rare_chance_bonus: 0.0,
        lure_bonus: 0,
        mining_efficiency: 0,
    };

    /// Whether this bonus changes nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Human-readable lines for every non-identity field.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let multipliers = [
            ("Yield", self.yield_multiplier),
            ("Seeds", self.seed_multiplier),
            ("Experience", self.xp_multiplier),
        ];
        for (label, value) in multipliers {
            if (value - 1.0).abs() > f64::EPSILON {
                lines.push(format!("{label} x{value:.2}"));
            }
        }
        let chances = [
            ("Prime chance", self.prime_chance_bonus),
            ("Trophy chance", self.trophy_chance_bonus),
            ("Rare chance", self.rare_chance_bonus),
        ];
        for (label, value) in chances {
            if value.abs() > f64::EPSILON {
                lines.push(format!("{label} +{:.1}%", value * 100.0));
            }
        }
        if self.lure_bonus != 0 {
            lines.push(format!("Lure +{}", self.lure_bonus));
        }
        if self.mining_efficiency != 0 {
            lines.push(format!("Mining efficiency +{}", self.mining_efficiency));
        }
        lines
    }

    fn validate(&self, job: JobClass, grade: Grade) -> JobResult<()> {
        let at = || format!("{job} {grade}");
        for (name, value) in [
            ("yield_multiplier", self.yield_multiplier),
            ("seed_multiplier", self.seed_multiplier),
            ("xp_multiplier", self.xp_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(JobError::InvalidConfig(format!(
                    "{}: {name} must be positive, got {value}",
                    at()
                )));
            }
        }
        for (name, value) in [
            ("prime_chance_bonus", self.prime_chance_bonus),
            ("trophy_chance_bonus", self.trophy_chance_bonus),
            ("rare_chance_bonus", self.rare_chance_bonus),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(JobError::InvalidConfig(format!(
                    "{}: {name} must be within 0..=1, got {value}",
                    at()
                )));
            }
        }
        if self.lure_bonus < 0 || self.mining_efficiency < 0 {
            return Err(JobError::InvalidConfig(format!(
                "{}: flat bonuses cannot be negative",
                at()
            )));
        }
        Ok(())
    }
}

impl Default for GradeBonus {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One configured row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeBonusEntry {
    /// Job the row applies to.
    pub job: JobClass,
    /// Grade the row applies to.
    pub grade: Grade,
    /// See [`GradeBonus::yield_multiplier`].
    #[serde(default = "one")]
    pub yield_multiplier: f64,
    /// See [`GradeBonus::seed_multiplier`].
    #[serde(default = "one")]
    pub seed_multiplier: f64,
    /// See [`GradeBonus::xp_multiplier`].
    #[serde(default = "one")]
    pub xp_multiplier: f64,
    /// See [`GradeBonus::prime_chance_bonus`].
    #[serde(default)]
    pub prime_chance_bonus: f64,
    /// See [`GradeBonus::trophy_chance_bonus`].
    #[serde(default)]
    pub trophy_chance_bonus: f64,
    /// See [`GradeBonus::rare_chance_bonus`].
    #[serde(default)]
    pub rare_chance_bonus: f64,
    /// See [`GradeBonus::lure_bonus`].
    #[serde(default)]
    pub lure_bonus: i32,
    /// See [`GradeBonus::mining_efficiency`].
    #[serde(default)]
    pub mining_efficiency: i32,
}

const fn one() -> f64 {
    1.0
}

impl GradeBonusEntry {
    /// The bonus values of this row.
    #[must_use]
    pub const fn bonus(&self) -> GradeBonus {
        GradeBonus {
            yield_multiplier: self.yield_multiplier,
            seed_multiplier: self.seed_multiplier,
            xp_multiplier: self.xp_multiplier,
            prime_chance_bonus: self.prime_chance_bonus,
            trophy_chance_bonus: self.trophy_chance_bonus,
            rare_chance_bonus: self.rare_chance_bonus,
            lure_bonus: self.lure_bonus,
            mining_efficiency: self.mining_efficiency,
        }
    }
}

/// Lookup of bonuses by (job, grade). Read-only once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradeBonusTable {
    entries: HashMap<(JobClass, Grade), GradeBonus>,
}

impl GradeBonusTable {
    /// An empty table (every lookup yields the identity bonus).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates rows and builds a table.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] on duplicate rows, grades above the
    /// job's cap, non-positive multipliers, chances outside 0..=1, or
    /// negative flat bonuses.
    pub fn from_entries(rows: &[GradeBonusEntry]) -> JobResult<Self> {
        let mut entries = HashMap::with_capacity(rows.len());
        for row in rows {
            if row.grade > row.job.max_grade() {
                return Err(JobError::InvalidConfig(format!(
                    "{} tops out at {}, bonus given for {}",
                    row.job,
                    row.job.max_grade(),
                    row.grade
                )));
            }
            let bonus = row.bonus();
            bonus.validate(row.job, row.grade)?;
            if entries.insert((row.job, row.grade), bonus).is_some() {
                return Err(JobError::InvalidConfig(format!(
                    "duplicate bonus row for {} {}",
                    row.job, row.grade
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Bonus for a (job, grade) pair; identity when absent.
    #[inline]
    #[must_use]
    pub fn get_bonus(&self, job: JobClass, grade: Grade) -> GradeBonus {
        self.entries
            .get(&(job, grade))
            .copied()
            .unwrap_or(GradeBonus::IDENTITY)
    }

    /// Number of configured rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no rows are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
