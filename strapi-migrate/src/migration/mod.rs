//! Write phases of a migration run.
//!
//! Each phase takes the content store and the run state and is applied once,
//! in the order [`MigrationExecutor::run_phases`] lists them. Writes are
//! issued one at a time so id maps fill in a deterministic order.

pub mod executor;
pub mod fields;
pub mod localization;
pub mod media;
pub mod projects;
pub mod report;
pub mod run;
pub mod skills;
pub mod wipe;

pub use executor::MigrationExecutor;
pub use report::{BackfillSummary, EntityOutcome, MigrationReport, OutcomeCounts, SkipReason};
pub use run::MigrationRun;
pub use skills::{backfill_category_skills, group_skills_by_category};
