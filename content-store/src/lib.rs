//! # Content Store
//!
//! This crate provides the interface the migrator writes through, a concrete
//! implementation for the Payload CMS REST API and an in-memory mock used by
//! tests and dry runs.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod mock;
pub mod payload;
pub mod types;

pub use config::{PayloadAuth, PayloadConfig};
pub use errors::ContentStoreError;
pub use interfaces::ContentStore;
pub use mock::MockContentStore;
pub use payload::PayloadProvider;
pub use types::{Collection, Document, DocumentId, FileUpload, Filter};
