//! # Job Engine Error Types
//!
//! All errors that can occur in the job engine.

use guildhall_shared::{JobClass, Tier};
use thiserror::Error;

use crate::grade::PromotionBlocker;

/// Errors that can occur in the job engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// Amount was zero or negative.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Player does not hold the job.
    #[error("player does not hold the {0} job")]
    JobNotHeld(JobClass),

    /// Player already holds the job.
    #[error("player already holds the {0} job")]
    JobAlreadyHeld(JobClass),

    /// Player already occupies the tier with another job.
    #[error("already has a job in this tier: {held} occupies {tier}")]
    TierOccupied {
        /// The tier in question.
        tier: Tier,
        /// The job currently occupying it.
        held: JobClass,
    },

    /// Tier-2 job requested without a Tier-1 job.
    #[error("{0} requires holding a Tier-1 job first")]
    MissingPrerequisiteTier(JobClass),

    /// An unlock rule failed.
    #[error("cannot unlock {job}: {message}")]
    UnlockDenied {
        /// Job that was requested.
        job: JobClass,
        /// Failure message of the first failing rule.
        message: String,
    },

    /// Promotion preconditions not met.
    #[error("promotion blocked: {0}")]
    PromotionBlocked(PromotionBlocker),

    /// Item kind has no catalog entry.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Job class has no registry entry.
    #[error("job not registered: {0}")]
    UnknownJob(JobClass),

    /// Ledger refused the withdrawal.
    #[error("withdrawal of {amount} failed")]
    WithdrawalFailed {
        /// Amount requested.
        amount: i64,
    },

    /// Ledger refused the deposit.
    #[error("deposit of {amount} failed")]
    DepositFailed {
        /// Amount offered.
        amount: i64,
    },

    /// Configuration is structurally valid TOML but semantically wrong.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration failed to parse.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    /// Configuration file could not be read.
    #[error("configuration io error: {0}")]
    ConfigIo(String),
}

impl From<toml::de::Error> for JobError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigIo(err.to_string())
    }
}

/// Result type for job engine operations.
pub type JobResult<T> = Result<T, JobError>;
