//! # Guildhall Job Engine
//!
//! Job progression and job-driven pricing for the Guildhall server.
//!
//! ## Design Principles
//!
//! 1. **One source of truth for level** - level is always derived from
//!    experience through the [`ExperienceCurve`]
//! 2. **Snapshot reloads** - every tunable table is swapped whole, never
//!    patched in place
//! 3. **Per-player serialization** - one player's record is mutated under
//!    that player's lock only
//! 4. **Withdrawal commits** - a promotion happens only once the ledger has
//!    taken the money
//! 5. **External configuration** - all balance data in TOML files
//!
//! ## Example
//!
//! ```rust,ignore
//! use guildhall_jobs::{EngineConfig, EngineContext, JobService, Rules, SellService};
//!
//! let config = EngineConfig::from_file("data/schemas/jobs.toml")?;
//! let ctx = EngineContext::new(
//!     Arc::new(Rules::from_config(&config)?),
//!     store,
//!     ledger,
//!     events,
//! );
//!
//! let jobs = JobService::new(ctx.clone());
//! let shop = SellService::new(ctx);
//!
//! jobs.select_job(player, JobClass::Miner)?;
//! let sale = shop.sell(player, "iron_ore", 16);
//! let promotion = jobs.promote(player, JobClass::Miner)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bonus;
pub mod catalog;
pub mod config;
pub mod context;
pub mod curve;
pub mod error;
pub mod experience;
pub mod grade;
pub mod ledger;
pub mod locks;
pub mod pricing;
pub mod profile;
pub mod registry;
pub mod rules;
pub mod sell;
pub mod service;
pub mod sink;
pub mod snapshot;
pub mod store;
pub mod unlock;

pub use bonus::{GradeBonus, GradeBonusEntry, GradeBonusTable};
pub use catalog::{Catalog, CatalogEntry};
pub use config::{EngineConfig, ExperienceConfig};
pub use context::EngineContext;
pub use curve::{ExperienceCurve, ExperienceSegment, MAX_EXP};
pub use error::{JobError, JobResult};
pub use experience::ExperienceService;
pub use grade::{GradeService, PromotionBlocker, PromotionCheck, PromotionResult};
pub use ledger::{EconomyLedger, MemoryLedger};
pub use locks::PlayerLocks;
pub use pricing::{PriceStanding, PricingPolicy, PricingRules};
pub use profile::{JobProfile, JobProfiles, PromotionRequirement};
pub use registry::JobRegistry;
pub use rules::{ReloadReport, Rules};
pub use sell::{SaleResult, SellService};
pub use service::{JobService, JobSummary};
pub use sink::{BufferedSink, ChannelSink, EventSink, NullSink};
pub use snapshot::Snapshot;
pub use store::{MemoryPlayerStore, PlayerStore, ProgressionRecord, SalesStats};
pub use unlock::{UnlockContext, UnlockRule, UnlockRuleConfig, UnlockRules, UnlockStatus};

pub use guildhall_shared::{EventKind, Grade, JobClass, JobEvent, PlayerId, Tier};
