//! Error types for the content store.
//!
//! This module provides a unified error type for all content store operations.

mod content_store_error;

pub use content_store_error::ContentStoreError;
