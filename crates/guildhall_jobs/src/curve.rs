//! # Experience Curve
//!
//! **Piecewise quadratic level costs with O(1) cumulative lookup**
//!
//! The cost to advance from `level` to `level + 1` is
//! `base + level² × multiplier`, where `(base, multiplier)` come from the
//! segment covering `level`. Exactly four contiguous segments span levels
//! 1..=100. Tier-2 jobs use the same table truncated at their own cap.
//!
//! ## Lookup table
//!
//! ```text
//! cumulative[0]     = 0          (unused)
//! cumulative[1]     = 0
//! cumulative[L + 1] = cumulative[L] + cost(L)
//! ```
//!
//! - `cumulative_exp_for_level`: O(1) index
//! - `level_for`: O(log n) binary search over the table
//! - Rebuild: O(n), only on reload
//!
//! The curve is immutable once built; reloads build a new curve and swap it
//! in through a [`crate::snapshot::Snapshot`].

use serde::{Deserialize, Serialize};

use crate::error::{JobError, JobResult};

/// Experience ceiling. Every write is clamped into `[0, MAX_EXP]`.
pub const MAX_EXP: i64 = 1_000_000_000;

/// Number of segments a curve must have.
pub const SEGMENT_COUNT: usize = 4;

/// Highest level the shared table covers (the Tier-1 cap).
pub const CURVE_MAX_LEVEL: u32 = 100;

/// Segments shipped when no configuration has been loaded.
pub const DEFAULT_SEGMENTS: [ExperienceSegment; SEGMENT_COUNT] = [
    ExperienceSegment::new(1, 19, 100.0, 10.0),
    ExperienceSegment::new(20, 39, 500.0, 15.0),
    ExperienceSegment::new(40, 79, 2_000.0, 20.0),
    ExperienceSegment::new(80, 100, 10_000.0, 30.0),
];

/// Clamps an experience value into `[0, MAX_EXP]`.
#[inline]
#[must_use]
pub const fn clamp_exp(experience: i64) -> i64 {
    if experience < 0 {
        0
    } else if experience > MAX_EXP {
        MAX_EXP
    } else {
        experience
    }
}

/// One quadratic piece of the curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSegment {
    /// First level this segment prices.
    pub min_level: u32,
    /// Last level this segment prices.
    pub max_level: u32,
    /// Constant term.
    pub base: f64,
    /// Quadratic coefficient.
    pub multiplier: f64,
}

impl ExperienceSegment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(min_level: u32, max_level: u32, base: f64, multiplier: f64) -> Self {
        Self {
            min_level,
            max_level,
            base,
            multiplier,
        }
    }

    /// Whether `level` falls inside this segment.
    #[inline]
    #[must_use]
    pub const fn covers(&self, level: u32) -> bool {
        level >= self.min_level && level <= self.max_level
    }

    /// Cost to advance from `level` to `level + 1`.
    #[inline]
    #[must_use]
    pub fn cost(&self, level: u32) -> i64 {
        let l = f64::from(level);
        (self.base + l * l * self.multiplier).round() as i64
    }
}

/// A built experience curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceCurve {
    segments: [ExperienceSegment; SEGMENT_COUNT],
    /// `cumulative[level]` = total experience at which `level` is reached.
    cumulative: Vec<i64>,
}

impl ExperienceCurve {
    /// Validates segments and builds the cumulative table.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidConfig`] if the segments are not exactly
    /// four, do not start at level 1, are not contiguous, do not end at
    /// level 100, contain negative or non-finite coefficients, price any
    /// level at less than 1 experience, or make the top level unreachable
    /// below [`MAX_EXP`].
    pub fn from_segments(segments: &[ExperienceSegment]) -> JobResult<Self> {
        let segments: [ExperienceSegment; SEGMENT_COUNT] = segments.try_into().map_err(|_| {
            JobError::InvalidConfig(format!(
                "experience curve needs exactly {SEGMENT_COUNT} segments, got {}",
                segments.len()
            ))
        })?;

        if segments[0].min_level != 1 {
            return Err(JobError::InvalidConfig(format!(
                "first segment must start at level 1, starts at {}",
                segments[0].min_level
            )));
        }

        for (i, seg) in segments.iter().enumerate() {
            if seg.min_level > seg.max_level {
                return Err(JobError::InvalidConfig(format!(
                    "segment {i} has min_level {} above max_level {}",
                    seg.min_level, seg.max_level
                )));
            }
            if !seg.base.is_finite() || !seg.multiplier.is_finite() {
                return Err(JobError::InvalidConfig(format!(
                    "segment {i} has a non-finite coefficient"
                )));
            }
            if seg.base < 0.0 || seg.multiplier < 0.0 {
                return Err(JobError::InvalidConfig(format!(
                    "segment {i} has a negative coefficient"
                )));
            }
            if let Some(next) = segments.get(i + 1) {
                if next.min_level != seg.max_level + 1 {
                    return Err(JobError::InvalidConfig(format!(
                        "segment {} starts at {} but segment {i} ends at {}",
                        i + 1,
                        next.min_level,
                        seg.max_level
                    )));
                }
            }
        }

        let last = segments[SEGMENT_COUNT - 1];
        if last.max_level != CURVE_MAX_LEVEL {
            return Err(JobError::InvalidConfig(format!(
                "last segment must end at level {CURVE_MAX_LEVEL}, ends at {}",
                last.max_level
            )));
        }

        let curve = Self::build(segments);

        if let Some(level) = (1..CURVE_MAX_LEVEL).find(|&l| curve.level_up_cost(l) < 1) {
            return Err(JobError::InvalidConfig(format!(
                "level {level} costs less than 1 experience"
            )));
        }
        let top = curve.cumulative[CURVE_MAX_LEVEL as usize];
        if top > MAX_EXP {
            return Err(JobError::InvalidConfig(format!(
                "level {CURVE_MAX_LEVEL} needs {top} experience, above the {MAX_EXP} ceiling"
            )));
        }

        Ok(curve)
    }

    /// Builds the table without validation.
    fn build(segments: [ExperienceSegment; SEGMENT_COUNT]) -> Self {
        let mut cumulative = vec![0i64; CURVE_MAX_LEVEL as usize + 1];
        for level in 1..CURVE_MAX_LEVEL {
            let cost = segments
                .iter()
                .find(|s| s.covers(level))
                .map_or(0, |s| s.cost(level));
            let idx = level as usize;
            cumulative[idx + 1] = cumulative[idx].saturating_add(cost);
        }
        Self {
            segments,
            cumulative,
        }
    }

    /// The segments this curve was built from.
    #[must_use]
    pub const fn segments(&self) -> &[ExperienceSegment; SEGMENT_COUNT] {
        &self.segments
    }

    /// Highest level in the table.
    #[inline]
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        CURVE_MAX_LEVEL
    }

    /// Experience needed to advance from `level` to `level + 1`.
    ///
    /// Returns 0 at or above the table's top level.
    #[must_use]
    pub fn level_up_cost(&self, level: u32) -> i64 {
        if level >= CURVE_MAX_LEVEL {
            return 0;
        }
        let level = level.max(1) as usize;
        self.cumulative[level + 1] - self.cumulative[level]
    }

    /// Total experience at which `level` is reached. O(1).
    #[inline]
    #[must_use]
    pub fn cumulative_exp_for_level(&self, level: u32) -> i64 {
        self.cumulative[level.clamp(1, CURVE_MAX_LEVEL) as usize]
    }

    /// Highest level whose threshold is `<= experience`. O(log n).
    #[inline]
    #[must_use]
    pub fn level_for(&self, experience: i64) -> u32 {
        self.level_for_capped(experience, CURVE_MAX_LEVEL)
    }

    /// Same as [`Self::level_for`], truncated at `cap` (Tier-2 jobs).
    #[must_use]
    pub fn level_for_capped(&self, experience: i64, cap: u32) -> u32 {
        let cap = cap.clamp(1, CURVE_MAX_LEVEL) as usize;
        let experience = clamp_exp(experience);
        // cumulative[1] == 0, so at least one entry always qualifies
        self.cumulative[1..=cap].partition_point(|&threshold| threshold <= experience) as u32
    }

    /// Fraction of the way from `level`'s threshold to the next one.
    ///
    /// Returns 1.0 at the top of the table.
    #[must_use]
    pub fn progress(&self, level: u32, experience: i64) -> f64 {
        if level >= CURVE_MAX_LEVEL {
            return 1.0;
        }
        let floor = self.cumulative_exp_for_level(level);
        let span = self.level_up_cost(level);
        if span <= 0 {
            return 1.0;
        }
        ((experience - floor) as f64 / span as f64).clamp(0.0, 1.0)
    }
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self::build(DEFAULT_SEGMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segments_are_valid() {
        let built = ExperienceCurve::from_segments(&DEFAULT_SEGMENTS).unwrap();
        assert_eq!(built, ExperienceCurve::default());
    }

    #[test]
    fn test_first_level_cost() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.level_up_cost(1), 110);
        assert_eq!(curve.cumulative_exp_for_level(2), 110);
        assert_eq!(curve.level_for(109), 1);
        assert_eq!(curve.level_for(110), 2);
    }

    #[test]
    fn test_segment_boundary_uses_next_segment() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.level_up_cost(19), 100 + 19 * 19 * 10);
        assert_eq!(curve.level_up_cost(20), 500 + 20 * 20 * 15);
    }

    #[test]
    fn test_cost_is_zero_at_top() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.level_up_cost(100), 0);
        assert_eq!(curve.level_up_cost(250), 0);
        assert!(curve.level_up_cost(99) > 0);
    }

    #[test]
    fn test_round_trip_every_level() {
        let curve = ExperienceCurve::default();
        for level in 1..=CURVE_MAX_LEVEL {
            assert_eq!(curve.level_for(curve.cumulative_exp_for_level(level)), level);
        }
    }

    #[test]
    fn test_level_for_clamps_inputs() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.level_for(-50), 1);
        assert_eq!(curve.level_for(i64::MAX), CURVE_MAX_LEVEL);
    }

    #[test]
    fn test_tier_two_truncation() {
        let curve = ExperienceCurve::default();
        let plenty = curve.cumulative_exp_for_level(90);
        assert_eq!(curve.level_for_capped(plenty, 70), 70);
        assert_eq!(curve.level_for_capped(110, 70), 2);
    }

    #[test]
    fn test_progress_midpoint() {
        let curve = ExperienceCurve::default();
        assert!((curve.progress(1, 55) - 0.5).abs() < 1e-9);
        assert!((curve.progress(1, 0)).abs() < 1e-9);
        assert!((curve.progress(100, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        let err = ExperienceCurve::from_segments(&DEFAULT_SEGMENTS[..3]).unwrap_err();
        assert!(matches!(err, JobError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_gap() {
        let mut segments = DEFAULT_SEGMENTS;
        segments[2].min_level = 41;
        assert!(ExperienceCurve::from_segments(&segments).is_err());
    }

    #[test]
    fn test_rejects_short_coverage() {
        let mut segments = DEFAULT_SEGMENTS;
        segments[3].max_level = 90;
        assert!(ExperienceCurve::from_segments(&segments).is_err());
    }

    #[test]
    fn test_rejects_zero_cost_levels() {
        let mut segments = DEFAULT_SEGMENTS;
        segments[0].base = 0.0;
        segments[0].multiplier = 0.0;
        assert!(ExperienceCurve::from_segments(&segments).is_err());
    }

    #[test]
    fn test_rejects_unreachable_top() {
        let mut segments = DEFAULT_SEGMENTS;
        segments[3].multiplier = 1.0e7;
        assert!(ExperienceCurve::from_segments(&segments).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let mut segments = DEFAULT_SEGMENTS;
        segments[1].base = f64::NAN;
        assert!(ExperienceCurve::from_segments(&segments).is_err());
    }
}
