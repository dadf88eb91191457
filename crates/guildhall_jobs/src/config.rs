//! # Engine Configuration
//!
//! TOML document with one optional section per reloadable table. Missing
//! sections leave the live table alone, so a partial file is a partial
//! reload.
//!
//! ```toml
//! [experience]
//! segments = [
//!     { min_level = 1,  max_level = 19,  base = 100.0,   multiplier = 10.0 },
//!     { min_level = 20, max_level = 39,  base = 500.0,   multiplier = 15.0 },
//!     { min_level = 40, max_level = 79,  base = 2000.0,  multiplier = 20.0 },
//!     { min_level = 80, max_level = 100, base = 10000.0, multiplier = 30.0 },
//! ]
//!
//! [pricing]
//! level_bonus_percent = 7.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::bonus::GradeBonusEntry;
use crate::catalog::CatalogEntry;
use crate::curve::ExperienceSegment;
use crate::error::JobResult;
use crate::pricing::PricingRules;
use crate::profile::JobProfile;
use crate::unlock::UnlockRuleConfig;

/// `[experience]` section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceConfig {
    /// Exactly four contiguous segments covering levels 1..=100.
    pub segments: Vec<ExperienceSegment>,
}

/// A whole configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Curve segments.
    #[serde(default)]
    pub experience: Option<ExperienceConfig>,
    /// Pricing multipliers.
    #[serde(default)]
    pub pricing: Option<PricingRules>,
    /// Bonus rows.
    #[serde(default)]
    pub grade_bonus: Option<Vec<GradeBonusEntry>>,
    /// Per-job profiles keyed by job key (`miner`, `chef`, ...).
    #[serde(default)]
    pub jobs: Option<HashMap<String, JobProfile>>,
    /// Unlock rules.
    #[serde(default)]
    pub unlock: Option<Vec<UnlockRuleConfig>>,
    /// Item catalog.
    #[serde(default)]
    pub catalog: Option<Vec<CatalogEntry>>,
}

impl EngineConfig {
    /// Parses a TOML document. Values are validated later, per section, when
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::ConfigParse`](crate::JobError::ConfigParse) on
    /// malformed TOML or fields of the wrong shape.
    pub fn from_toml_str(source: &str) -> JobResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::ConfigIo`](crate::JobError::ConfigIo) if the file
    /// cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> JobResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Whether no section is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experience.is_none()
            && self.pricing.is_none()
            && self.grade_bonus.is_none()
            && self.jobs.is_none()
            && self.unlock.is_none()
            && self.catalog.is_none()
    }
}
