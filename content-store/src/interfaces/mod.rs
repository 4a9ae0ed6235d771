//! Interface definitions for the destination content store.
//!
//! This module defines the abstract `ContentStore` trait that allows the
//! migrator to run against the live CMS or the in-memory mock.

mod content_store;

pub use content_store::ContentStore;
