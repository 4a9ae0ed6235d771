//! Mock content store for testing and dry runs.
//!
//! The `MockContentStore` keeps every collection in memory, assigns sequential
//! numeric ids per collection and stores field values per locale. Reads in a
//! non-default locale fall back to the default locale for fields that locale
//! never set, as the destination CMS does.
//!
//! # Example
//!
//! ```ignore
//! use content_store::{Collection, ContentStore, MockContentStore};
//!
//! let store = MockContentStore::new("en");
//! let doc = store.create(Collection::Skills, &data).await?;
//! store.update(Collection::Skills, &doc.id, &german, Some("de")).await?;
//! assert_eq!(store.count(Collection::Skills), 1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ContentStoreError;
use crate::interfaces::ContentStore;
use crate::types::{Collection, Document, DocumentId, FileUpload, Filter};

#[derive(Debug, Clone)]
struct MockRecord {
    id: DocumentId,
    locales: HashMap<String, Map<String, Value>>,
}

impl MockRecord {
    /// Field values as read in `locale`, default-locale values underneath.
    fn view(&self, default_locale: &str, locale: Option<&str>) -> Map<String, Value> {
        let mut fields = self.locales.get(default_locale).cloned().unwrap_or_default();
        if let Some(locale) = locale.filter(|l| *l != default_locale) {
            if let Some(localized) = self.locales.get(locale) {
                for (k, v) in localized {
                    fields.insert(k.clone(), v.clone());
                }
            }
        }
        fields
    }

    fn document(&self, default_locale: &str, locale: Option<&str>) -> Document {
        Document {
            id: self.id.clone(),
            fields: self.view(default_locale, locale),
        }
    }
}

#[derive(Debug, Clone)]
struct Rejection {
    collection: Collection,
    field: String,
    value: Value,
}

#[derive(Debug, Default)]
struct MockState {
    collections: HashMap<Collection, Vec<MockRecord>>,
    next_ids: HashMap<Collection, i64>,
    rejections: Vec<Rejection>,
}

/// In-memory content store.
pub struct MockContentStore {
    default_locale: String,
    state: RwLock<MockState>,
    creates: AtomicUsize,
    uploads: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockContentStore {
    /// Create an empty store whose default locale is `default_locale`.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            state: RwLock::new(MockState::default()),
            creates: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Refuse any create, upload or update on `collection` whose data sets
    /// `field` to `value`.
    pub fn reject_when(&self, collection: Collection, field: &str, value: impl Into<Value>) {
        self.state.write().unwrap().rejections.push(Rejection {
            collection,
            field: field.to_string(),
            value: value.into(),
        });
    }

    /// Insert a record directly, bypassing call counters and rejections.
    pub fn seed(&self, collection: Collection, data: Map<String, Value>) -> DocumentId {
        let mut state = self.state.write().unwrap();
        Self::insert(&mut state, &self.default_locale, collection, data)
    }

    /// Every document in `collection`, read in `locale`.
    pub fn documents(&self, collection: Collection, locale: Option<&str>) -> Vec<Document> {
        self.state
            .read()
            .unwrap()
            .collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|r| r.document(&self.default_locale, locale))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A single document read in `locale`.
    pub fn get(
        &self,
        collection: Collection,
        id: &DocumentId,
        locale: Option<&str>,
    ) -> Option<Document> {
        self.state
            .read()
            .unwrap()
            .collections
            .get(&collection)?
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.document(&self.default_locale, locale))
    }

    /// Values written under exactly `locale`, without fallback.
    pub fn locale_fields(
        &self,
        collection: Collection,
        id: &DocumentId,
        locale: &str,
    ) -> Option<Map<String, Value>> {
        self.state
            .read()
            .unwrap()
            .collections
            .get(&collection)?
            .iter()
            .find(|r| &r.id == id)?
            .locales
            .get(locale)
            .cloned()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.state
            .read()
            .unwrap()
            .collections
            .get(&collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn insert(
        state: &mut MockState,
        default_locale: &str,
        collection: Collection,
        data: Map<String, Value>,
    ) -> DocumentId {
        let next = state.next_ids.entry(collection).or_insert(0);
        *next += 1;
        let id = DocumentId::Number(*next);

        let mut locales = HashMap::new();
        locales.insert(default_locale.to_string(), data);
        state
            .collections
            .entry(collection)
            .or_default()
            .push(MockRecord {
                id: id.clone(),
                locales,
            });
        id
    }

    fn check_rejections(
        state: &MockState,
        collection: Collection,
        data: &Map<String, Value>,
    ) -> Result<(), ContentStoreError> {
        let rejected = state.rejections.iter().find(|r| {
            r.collection == collection && data.get(&r.field) == Some(&r.value)
        });
        match rejected {
            Some(r) => Err(ContentStoreError::rejected(
                400,
                format!("mock rejected {}={} in {}", r.field, r.value, collection),
            )),
            None => Ok(()),
        }
    }

    fn create_record(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document, ContentStoreError> {
        let mut state = self.state.write().unwrap();
        Self::check_rejections(&state, collection, &data)?;
        let id = Self::insert(&mut state, &self.default_locale, collection, data.clone());
        Ok(Document { id, fields: data })
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new("en")
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn create(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
    ) -> Result<Document, ContentStoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.create_record(collection, data.clone())
    }

    async fn upload(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
        file: &FileUpload,
    ) -> Result<Document, ContentStoreError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let mut data = data.clone();
        data.insert("filename".to_string(), Value::from(file.name.clone()));
        data.insert("filesize".to_string(), Value::from(file.size()));
        if let Some(mime) = &file.mime_type {
            data.insert("mimeType".to_string(), Value::from(mime.clone()));
        }
        self.create_record(collection, data)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        data: &Map<String, Value>,
        locale: Option<&str>,
    ) -> Result<Document, ContentStoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().unwrap();
        Self::check_rejections(&state, collection, data)?;

        let record = state
            .collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| &r.id == id))
            .ok_or_else(|| {
                ContentStoreError::document_not_found(collection.slug(), &id.to_string())
            })?;

        let locale = locale.unwrap_or(&self.default_locale);
        let fields = record.locales.entry(locale.to_string()).or_default();
        for (k, v) in data {
            fields.insert(k.clone(), v.clone());
        }

        Ok(record.document(&self.default_locale, Some(locale)))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        locale: Option<&str>,
    ) -> Result<Vec<Document>, ContentStoreError> {
        Ok(self
            .documents(collection, locale)
            .into_iter()
            .filter(|doc| filter.matches(&doc.id, &doc.fields))
            .collect())
    }

    async fn delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, ContentStoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().unwrap();
        let Some(records) = state.collections.get_mut(&collection) else {
            return Ok(0);
        };

        let before = records.len();
        let default_locale = self.default_locale.as_str();
        records.retain(|r| !filter.matches(&r.id, &r.view(default_locale, None)));
        Ok(before - records.len())
    }
}
