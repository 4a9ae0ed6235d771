//! This module defines the typed export records. It re-exports the entity and
//! link types.

pub mod entity;
pub mod link;

pub use entity::{Entity, EntityKey, EntityKind};
pub use link::{Link, LinkEnd, LinkKind, LinkRef, LOCALIZATIONS_FIELD};
