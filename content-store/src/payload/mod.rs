//! Payload CMS implementation of the content store.
//!
//! This module contains the REST provider and its query helpers.

mod provider;

pub use provider::PayloadProvider;
