//! # Guildhall Shared
//!
//! Common types used by the job engine and by the hosts that call into it.
//!
//! ## CRITICAL RULE
//!
//! This crate holds identifiers and plain values only. Anything that owns
//! state, takes a lock or logs belongs in `guildhall_jobs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod events;
pub mod grade;
pub mod job;

pub use events::{EventKind, JobEvent};
pub use grade::Grade;
pub use job::{JobClass, ParseJobClassError, Tier};

/// Player identifier (matches the host's entity id space).
pub type PlayerId = u64;
