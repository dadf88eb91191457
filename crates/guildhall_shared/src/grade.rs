//! # Grades
//!
//! Promotion rank within a job class. Grades are totally ordered and only
//! ever move one step at a time; [`Grade::next`] and [`Grade::previous`] are
//! partial at the bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Promotion rank (1..=4; Tier-2 jobs stop at 3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Grade {
    /// Starting grade, granted with the job.
    #[default]
    First = 1,
    /// First promotion.
    Second = 2,
    /// Second promotion.
    Third = 3,
    /// Final promotion (Tier-1 only).
    Fourth = 4,
}

impl Grade {
    /// Every grade, lowest first.
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    /// Converts from the ordinal (1..=4).
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            _ => None,
        }
    }

    /// Converts from any ordinal, clamped into `1..=max`.
    #[must_use]
    pub fn clamped(value: i64, max: Self) -> Self {
        let upper = i64::from(max.as_u8());
        Self::from_u8(value.clamp(1, upper) as u8).unwrap_or(Self::First)
    }

    /// The ordinal value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The grade above this one, if any.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::from_u8(self as u8 + 1)
    }

    /// The grade below this one, if any.
    #[inline]
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        Self::from_u8((self as u8).saturating_sub(1))
    }

    /// Built-in minimum level to be promoted into this grade.
    #[inline]
    #[must_use]
    pub const fn default_required_level(self) -> u32 {
        match self {
            Self::First => 1,
            Self::Second => 20,
            Self::Third => 40,
            Self::Fourth => 80,
        }
    }

    /// Built-in currency cost to be promoted into this grade.
    #[inline]
    #[must_use]
    pub const fn default_cost(self) -> i64 {
        match self {
            Self::First => 0,
            Self::Second => 10_000,
            Self::Third => 50_000,
            Self::Fourth => 200_000,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or_else(|| format!("grade must be 1..=4, got {value}"))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.as_u8()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_previous_are_partial() {
        assert_eq!(Grade::First.previous(), None);
        assert_eq!(Grade::First.next(), Some(Grade::Second));
        assert_eq!(Grade::Third.previous(), Some(Grade::Second));
        assert_eq!(Grade::Fourth.next(), None);
    }

    #[test]
    fn test_default_requirements() {
        let pairs: Vec<(u32, i64)> = Grade::ALL
            .iter()
            .map(|g| (g.default_required_level(), g.default_cost()))
            .collect();
        assert_eq!(pairs, vec![(1, 0), (20, 10_000), (40, 50_000), (80, 200_000)]);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Grade::clamped(0, Grade::Fourth), Grade::First);
        assert_eq!(Grade::clamped(9, Grade::Third), Grade::Third);
        assert_eq!(Grade::clamped(2, Grade::Fourth), Grade::Second);
    }

    #[test]
    fn test_ordering() {
        assert!(Grade::First < Grade::Second);
        assert!(Grade::Fourth > Grade::Third);
    }
}
