//! # Strapi Migrate
//!
//! One-shot migration of a Strapi content export (`entities_*.jsonl`,
//! `links_*.jsonl` and the uploaded assets) into Payload CMS.
//!
//! ## Architecture
//!
//! The run is a strictly sequential pipeline:
//!
//! 1. **Loader**: parses entities and links into memory
//! 2. **Relations**: indexes links by source entity and field
//! 3. **Migration**: wipes the destination, then writes media, skill
//!    categories, skills and projects in default locale, recording
//!    legacy id → destination id per collection
//! 4. **Localization**: applies translated fields onto the records created
//!    for their default-locale counterparts
//!
//! ## Modules
//!
//! - [`config`]: Paths, default locale and environment handling
//! - [`loader`]: JSON-lines readers for entities and links
//! - [`relations`]: Relationship index
//! - [`id_map`]: Legacy id → destination id tables
//! - [`migration`]: Phases, executor and report
//! - [`transfer`]: Export/import of destination collections and relation repair
//! - [`errors`]: Error types

pub mod config;
pub mod errors;
pub mod id_map;
pub mod loader;
pub mod logging;
pub mod migration;
pub mod relations;
pub mod transfer;

pub use config::MigrateConfig;
pub use errors::{MigrateError, ParseError};
pub use migration::{MigrationExecutor, MigrationReport};
