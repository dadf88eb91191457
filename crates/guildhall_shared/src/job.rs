//! # Job Classes and Tiers
//!
//! The fixed set of player-selectable progression tracks.
//!
//! Every job class belongs to exactly one [`Tier`]. The tier decides the
//! level cap and the grade cap; nothing else about a job is hard-coded here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::grade::Grade;

/// Progression band of a job class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Tier {
    /// Entry jobs, selectable without prerequisites.
    One = 1,
    /// Advanced jobs, selectable only while holding a Tier-1 job.
    Two = 2,
}

impl Tier {
    /// Highest level reachable by jobs of this tier.
    #[inline]
    #[must_use]
    pub const fn max_level(self) -> u32 {
        match self {
            Self::One => 100,
            Self::Two => 70,
        }
    }

    /// Highest grade reachable by jobs of this tier.
    #[inline]
    #[must_use]
    pub const fn max_grade(self) -> Grade {
        match self {
            Self::One => Grade::Fourth,
            Self::Two => Grade::Third,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("Tier-1"),
            Self::Two => f.write_str("Tier-2"),
        }
    }
}

/// A job class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JobClass {
    /// Breaks ore and stone.
    Miner = 0,
    /// Grows and harvests crops.
    Farmer = 1,
    /// Catches fish.
    Fisher = 2,
    /// Gathers wild herbs.
    Herbalist = 3,
    /// Cooks dishes from gathered ingredients.
    Chef = 4,
    /// Crafts goods from refined materials.
    Artisan = 5,
    /// Builds machines and contraptions.
    Engineer = 6,
}

impl JobClass {
    /// Every job class, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Miner,
        Self::Farmer,
        Self::Fisher,
        Self::Herbalist,
        Self::Chef,
        Self::Artisan,
        Self::Engineer,
    ];

    /// The tier this job belongs to.
    #[inline]
    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            Self::Miner | Self::Farmer | Self::Fisher | Self::Herbalist => Tier::One,
            Self::Chef | Self::Artisan | Self::Engineer => Tier::Two,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Miner => "Miner",
            Self::Farmer => "Farmer",
            Self::Fisher => "Fisher",
            Self::Herbalist => "Herbalist",
            Self::Chef => "Chef",
            Self::Artisan => "Artisan",
            Self::Engineer => "Engineer",
        }
    }

    /// Configuration key (`snake_case`, matches the serde name).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Miner => "miner",
            Self::Farmer => "farmer",
            Self::Fisher => "fisher",
            Self::Herbalist => "herbalist",
            Self::Chef => "chef",
            Self::Artisan => "artisan",
            Self::Engineer => "engineer",
        }
    }

    /// Level cap derived from the tier.
    #[inline]
    #[must_use]
    pub const fn max_level(self) -> u32 {
        self.tier().max_level()
    }

    /// Grade cap derived from the tier.
    #[inline]
    #[must_use]
    pub const fn max_grade(self) -> Grade {
        self.tier().max_grade()
    }
}

impl fmt::Display for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a string names no job class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseJobClassError(pub String);

impl fmt::Display for ParseJobClassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job class: {}", self.0)
    }
}

impl std::error::Error for ParseJobClassError {}

impl FromStr for JobClass {
    type Err = ParseJobClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|job| job.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseJobClassError(wanted.to_string()))
    }
}
