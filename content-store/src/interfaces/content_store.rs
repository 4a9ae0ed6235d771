//! Content store trait definition.
//!
//! This module defines the abstract interface the migrator writes through,
//! allowing different backends (the Payload REST API, an in-memory mock).

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ContentStoreError;
use crate::types::{Collection, Document, DocumentId, FileUpload, Filter};

/// Abstracts the destination CMS.
///
/// Implementations are injected into the migration executor so the whole run
/// can be exercised against the mock. Calls are issued one at a time by the
/// migrator; implementations need not order concurrent writers.
///
/// # Localization
///
/// Records are created in the store's default locale. `update` with a locale
/// writes that locale's values onto the same record id; fields the store
/// does not localize are shared by every locale.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a record in the default locale.
    ///
    /// # Arguments
    ///
    /// * `collection` - Target collection
    /// * `data` - Field values of the new record
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The created record with its assigned id
    /// * `Err(ContentStoreError)` - If the store refused the record
    async fn create(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
    ) -> Result<Document, ContentStoreError>;

    /// Create a record in an upload collection together with its file.
    async fn upload(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
        file: &FileUpload,
    ) -> Result<Document, ContentStoreError>;

    /// Merge field values into an existing record.
    ///
    /// With `locale` set, only that locale's values are written.
    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        data: &Map<String, Value>,
        locale: Option<&str>,
    ) -> Result<Document, ContentStoreError>;

    /// Find records matching the filter, read in the given locale.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        locale: Option<&str>,
    ) -> Result<Vec<Document>, ContentStoreError>;

    /// Delete records matching the filter and return how many were removed.
    async fn delete(&self, collection: Collection, filter: &Filter)
        -> Result<usize, ContentStoreError>;
}
