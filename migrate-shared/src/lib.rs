//! # Migrate Shared
//!
//! This crate defines the records found in a Strapi content export: entities
//! (`entities_*.jsonl`) and the links between them (`links_*.jsonl`). Both the
//! migrator and its companion tools depend on these definitions.

pub mod types;

pub use types::entity::{Entity, EntityKey, EntityKind};
pub use types::link::{Link, LinkEnd, LinkKind, LinkRef, LOCALIZATIONS_FIELD};
