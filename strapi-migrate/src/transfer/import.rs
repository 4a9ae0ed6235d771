//! Import of a collection export into a (fresh) destination.
//!
//! The store hands out new ids, so every relationship field is rewritten
//! through old → new id maps filled while the referenced collections are
//! imported. Collections are therefore replayed in dependency order.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};

use content_store::{Collection, ContentStore, DocumentId, FileUpload};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::export::ExportData;
use crate::errors::MigrateError;

/// Collections replayed by `import_data`, referenced collections first.
pub const IMPORT_ORDER: [Collection; 5] = [
    Collection::Users,
    Collection::Media,
    Collection::SkillCategories,
    Collection::Skills,
    Collection::SoftwareProjects,
];

// Assigned by the store on create
const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

// Derived from the uploaded file on create
const UPLOAD_FIELDS: &[&str] = &[
    "filename",
    "filesize",
    "mimeType",
    "url",
    "thumbnailURL",
    "width",
    "height",
    "focalX",
    "focalY",
    "sizes",
];

/// Relationship fields rewritten per collection: (field, referenced collection, has many).
fn relationship_fields(collection: Collection) -> &'static [(&'static str, Collection, bool)] {
    match collection {
        Collection::Skills => &[
            ("skill_category", Collection::SkillCategories, false),
            ("svgIcon", Collection::Media, false),
        ],
        Collection::SoftwareProjects => &[
            ("coverImage", Collection::Media, false),
            ("gallery", Collection::Media, true),
        ],
        Collection::Users | Collection::Media | Collection::SkillCategories => &[],
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Password given to exported users, whose password is never exported.
    pub user_password: Option<String>,
    /// Directory holding the media files named by their `filename`.
    pub media_dir: Option<PathBuf>,
}

impl ImportOptions {
    /// Read options from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `IMPORT_USER_PASSWORD`: password for imported users (users are skipped without it)
    /// - `IMPORT_MEDIA_DIR`: directory of media files (media are skipped without it)
    pub fn from_env() -> Self {
        Self {
            user_password: env::var("IMPORT_USER_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
            media_dir: env::var("IMPORT_MEDIA_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Per-collection import counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSummary {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone)]
pub struct ImportSummary {
    pub collections: Vec<(Collection, CollectionSummary)>,
}

impl ImportSummary {
    pub fn get(&self, collection: Collection) -> CollectionSummary {
        self.collections
            .iter()
            .find(|(c, _)| *c == collection)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    pub fn failed(&self) -> usize {
        self.collections.iter().map(|(_, s)| s.failed).sum()
    }
}

/// Read an export written by `export_data`.
pub async fn read_export(path: &Path) -> Result<ExportData, MigrateError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MigrateError::MissingInput(path.to_path_buf()))
        }
        Err(e) => return Err(MigrateError::io(path, e)),
    };
    parse_export(&bytes).map_err(|e| MigrateError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse an export document. Collections whose value is `null` are skipped.
fn parse_export(bytes: &[u8]) -> Result<ExportData, serde_json::Error> {
    let raw: BTreeMap<String, Option<Vec<Value>>> = serde_json::from_slice(bytes)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, docs)| match docs {
            Some(docs) => Some((name, docs)),
            None => {
                warn!(collection = %name, "Export has no documents for collection, skipping");
                None
            }
        })
        .collect())
}

type IdRemap = HashMap<Collection, HashMap<DocumentId, DocumentId>>;

/// A document ready to be sent, or the reason it is not.
#[derive(Debug, Clone)]
enum Prepared {
    Create(Map<String, Value>),
    Upload(Map<String, Value>, FileUpload),
    Skip(String),
}

/// Replay `data` into `store`. Failures of single documents are logged and
/// counted; the import always runs to the end.
#[instrument(skip_all)]
pub async fn import_collections(
    store: &dyn ContentStore,
    data: &ExportData,
    options: &ImportOptions,
) -> ImportSummary {
    let mut remap: IdRemap = HashMap::new();
    let mut summary = ImportSummary::default();

    for collection in IMPORT_ORDER {
        info!("Importing {}...", collection);
        let mut counts = CollectionSummary::default();
        let docs = data.get(collection.slug()).map(Vec::as_slice).unwrap_or(&[]);

        for doc in docs {
            let old_id = doc.get("id").and_then(DocumentId::from_reference);
            let label = old_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "?".to_string());

            let prepared = prepare(collection, doc, &remap, options).await;
            let result = match prepared {
                Prepared::Skip(reason) => {
                    warn!(
                        collection = %collection,
                        id = %label,
                        reason = %reason,
                        "Skipping document"
                    );
                    counts.skipped += 1;
                    continue;
                }
                Prepared::Create(fields) => store.create(collection, &fields).await,
                Prepared::Upload(fields, file) => store.upload(collection, &fields, &file).await,
            };

            match result {
                Ok(created) => {
                    info!("Imported {} {} -> {}", collection, label, created.id);
                    if let Some(old_id) = old_id {
                        remap
                            .entry(collection)
                            .or_default()
                            .insert(old_id, created.id);
                    }
                    counts.imported += 1;
                }
                Err(e) => {
                    error!(
                        collection = %collection,
                        id = %label,
                        error = %e,
                        "Failed to import document"
                    );
                    counts.failed += 1;
                }
            }
        }

        summary.collections.push((collection, counts));
    }

    summary
}

async fn prepare(
    collection: Collection,
    doc: &Value,
    remap: &IdRemap,
    options: &ImportOptions,
) -> Prepared {
    let Some(source) = doc.as_object() else {
        return Prepared::Skip("not a JSON object".to_string());
    };
    let mut fields = source.clone();
    for field in SYSTEM_FIELDS {
        fields.remove(*field);
    }

    match collection {
        Collection::Users => {
            let has_password = fields
                .get("password")
                .and_then(Value::as_str)
                .map(|p| !p.is_empty())
                .unwrap_or(false);
            if !has_password {
                let Some(password) = &options.user_password else {
                    return Prepared::Skip("no password and IMPORT_USER_PASSWORD unset".to_string());
                };
                fields.insert("password".to_string(), Value::String(password.clone()));
            }
        }
        Collection::SkillCategories => {
            fields.remove("skills");
        }
        Collection::Media => return prepare_upload(fields, options).await,
        Collection::Skills | Collection::SoftwareProjects => {}
    }

    remap_relationships(collection, &mut fields, remap);
    Prepared::Create(fields)
}

async fn prepare_upload(mut fields: Map<String, Value>, options: &ImportOptions) -> Prepared {
    let Some(filename) = fields.get("filename").and_then(Value::as_str).map(str::to_string) else {
        return Prepared::Skip("media without filename".to_string());
    };
    let Some(media_dir) = &options.media_dir else {
        return Prepared::Skip("IMPORT_MEDIA_DIR unset".to_string());
    };

    let path = media_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => return Prepared::Skip(format!("{}: {}", path.display(), e)),
    };
    let mime_type = fields
        .get("mimeType")
        .and_then(Value::as_str)
        .map(str::to_string);

    for field in UPLOAD_FIELDS {
        fields.remove(*field);
    }
    Prepared::Upload(fields, FileUpload::new(filename, mime_type, bytes))
}

/// Rewrite relationship fields through `remap`. References that were not
/// imported are dropped.
fn remap_relationships(collection: Collection, fields: &mut Map<String, Value>, remap: &IdRemap) {
    for &(field, target, has_many) in relationship_fields(collection) {
        let Some(value) = fields.remove(field) else {
            continue;
        };
        let ids = remap.get(&target);
        let lookup = |v: &Value| {
            DocumentId::from_reference(v)
                .and_then(|old| ids.and_then(|m| m.get(&old)))
                .map(Value::from)
        };

        if has_many {
            if let Value::Array(items) = &value {
                let mapped: Vec<Value> = items.iter().filter_map(lookup).collect();
                fields.insert(field.to_string(), Value::Array(mapped));
            }
        } else if let Some(mapped) = lookup(&value) {
            fields.insert(field.to_string(), mapped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_store::MockContentStore;
    use serde_json::json;

    fn export(value: Value) -> ExportData {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_import_remaps_relationships() {
        let media_dir = tempfile::tempdir().unwrap();
        tokio::fs::write(media_dir.path().join("logo.png"), b"png")
            .await
            .unwrap();

        let data = export(json!({
            "users": [
                {"id": 1, "email": "a@example.com"},
                {"id": 2, "email": "b@example.com", "password": "secret"}
            ],
            "media": [
                {"id": 40, "alt": "Logo", "filename": "logo.png", "mimeType": "image/png", "filesize": 3, "url": "/media/logo.png"},
                {"id": 41, "alt": "Gone", "filename": "gone.png"}
            ],
            "skill-categories": [
                {"id": 7, "name": "Languages", "skills": [9], "createdAt": "2024-01-01"}
            ],
            "skills": [
                {"id": 9, "name": "Rust", "skill_category": {"id": 7, "name": "Languages"}, "svgIcon": 41}
            ],
            "software-projects": [
                {"id": 3, "title": "Portfolio", "coverImage": 40, "gallery": [{"id": 40}, 41]}
            ]
        }));

        let store = MockContentStore::new("en");
        let options = ImportOptions {
            user_password: None,
            media_dir: Some(media_dir.path().to_path_buf()),
        };
        let summary = import_collections(&store, &data, &options).await;

        assert_eq!(
            summary.get(Collection::Users),
            CollectionSummary { imported: 1, skipped: 1, failed: 0 }
        );
        assert_eq!(summary.get(Collection::Media).imported, 1);
        assert_eq!(summary.get(Collection::Media).skipped, 1);
        assert_eq!(summary.failed(), 0);

        let media = store.documents(Collection::Media, None);
        assert_eq!(media[0].get("filename"), Some(&json!("logo.png")));
        assert!(media[0].get("url").is_none());

        let category = &store.documents(Collection::SkillCategories, None)[0];
        assert!(category.get("skills").is_none());
        assert!(category.get("createdAt").is_none());

        let skill = &store.documents(Collection::Skills, None)[0];
        assert_eq!(skill.get("skill_category"), Some(&Value::from(&category.id)));
        assert!(skill.get("svgIcon").is_none());

        let project = &store.documents(Collection::SoftwareProjects, None)[0];
        assert_eq!(project.get("coverImage"), Some(&Value::from(&media[0].id)));
        assert_eq!(project.get("gallery"), Some(&json!([Value::from(&media[0].id)])));
    }

    #[tokio::test]
    async fn test_default_password_and_failures() {
        let data = export(json!({
            "users": [{"id": 1, "email": "a@example.com"}],
            "skills": [{"id": 2, "name": "Rust"}, {"id": 3, "name": "Bad"}]
        }));
        let store = MockContentStore::new("en");
        store.reject_when(Collection::Skills, "name", "Bad");
        let options = ImportOptions {
            user_password: Some("changeme".to_string()),
            media_dir: None,
        };

        let summary = import_collections(&store, &data, &options).await;

        assert_eq!(summary.get(Collection::Users).imported, 1);
        assert_eq!(summary.get(Collection::Skills).failed, 1);
        assert_eq!(
            store.documents(Collection::Users, None)[0].get("password"),
            Some(&json!("changeme"))
        );
    }

    #[tokio::test]
    async fn test_read_export_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_export(&dir.path().join("none.json")).await.unwrap_err();
        assert!(matches!(missing, MigrateError::MissingInput(_)));

        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let broken = read_export(&path).await.unwrap_err();
        assert!(matches!(broken, MigrateError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_read_export_skips_null_collections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration-data.json");
        tokio::fs::write(
            &path,
            br#"{"users": [{"id": 1, "email": "a@example.com"}], "skills": null}"#,
        )
        .await
        .unwrap();

        let data = read_export(&path).await.unwrap();
        assert!(data.contains_key("users"));
        assert!(!data.contains_key("skills"));

        let store = MockContentStore::new("en");
        let options = ImportOptions {
            user_password: Some("changeme".to_string()),
            media_dir: None,
        };
        let summary = import_collections(&store, &data, &options).await;
        assert_eq!(summary.get(Collection::Users).imported, 1);
        assert_eq!(summary.get(Collection::Skills), CollectionSummary::default());
    }
}
