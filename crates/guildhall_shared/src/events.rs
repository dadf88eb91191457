//! Notifications emitted by the job engine.
//!
//! The engine hands these to an event sink and never waits for them to be
//! processed. Hosts use them for display updates, logging and achievements.

use serde::{Deserialize, Serialize};

use crate::grade::Grade;
use crate::job::JobClass;
use crate::PlayerId;

/// Event type discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Player gained one or more levels
    LevelUp = 0,
    /// Player was promoted
    GradeUp = 1,
    /// Player took up a job
    JobSelected = 2,
}

/// Engine notification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    /// Experience pushed the player past one or more level thresholds
    LevelUp {
        /// Player
        player: PlayerId,
        /// Job that levelled
        job: JobClass,
        /// Level before the gain
        old_level: u32,
        /// Level after the gain
        new_level: u32,
    },

    /// Promotion completed
    GradeUp {
        /// Player
        player: PlayerId,
        /// Job that was promoted
        job: JobClass,
        /// Grade before the promotion
        old_grade: Grade,
        /// Grade after the promotion
        new_grade: Grade,
        /// Descriptions of the new grade's bonuses
        bonuses: Vec<String>,
    },

    /// Job granted through selection or admin grant
    JobSelected {
        /// Player
        player: PlayerId,
        /// Job taken up
        job: JobClass,
    },
}

impl JobEvent {
    /// Discriminator for routing.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::LevelUp { .. } => EventKind::LevelUp,
            Self::GradeUp { .. } => EventKind::GradeUp,
            Self::JobSelected { .. } => EventKind::JobSelected,
        }
    }

    /// Player the event concerns.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::LevelUp { player, .. }
            | Self::GradeUp { player, .. }
            | Self::JobSelected { player, .. } => *player,
        }
    }

    /// Job the event concerns.
    #[must_use]
    pub const fn job(&self) -> JobClass {
        match self {
            Self::LevelUp { job, .. }
            | Self::GradeUp { job, .. }
            | Self::JobSelected { job, .. } => *job,
        }
    }
}
