// Export of destination collections into one JSON document
use std::collections::BTreeMap;
use std::path::Path;

use content_store::{Collection, ContentStore, Filter};
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::MigrateError;

/// Collections written by `export_data`, in export order.
pub const EXPORT_COLLECTIONS: [Collection; 5] = [
    Collection::Users,
    Collection::Media,
    Collection::SoftwareProjects,
    Collection::Skills,
    Collection::SkillCategories,
];

/// Collection slug → documents, `id` included.
pub type ExportData = BTreeMap<String, Vec<Value>>;

/// Read every document of the exported collections.
#[instrument(skip_all)]
pub async fn export_collections(store: &dyn ContentStore) -> Result<ExportData, MigrateError> {
    let mut data = ExportData::new();

    for collection in EXPORT_COLLECTIONS {
        info!("Exporting {}...", collection);
        let docs = store.find(collection, &Filter::All, None).await?;
        info!(collection = %collection, documents = docs.len(), "Exported collection");
        data.insert(
            collection.slug().to_string(),
            docs.iter().map(|doc| doc.to_value()).collect(),
        );
    }

    Ok(data)
}

/// Write `data` as pretty-printed JSON.
pub async fn write_export(path: &Path, data: &ExportData) -> Result<(), MigrateError> {
    let bytes = serde_json::to_vec_pretty(data)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| MigrateError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_store::MockContentStore;
    use serde_json::{json, Map};

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_export_all_collections() {
        let store = MockContentStore::new("en");
        store.seed(Collection::Skills, data(json!({"name": "Rust"})));
        store.seed(Collection::Users, data(json!({"email": "me@example.com"})));

        let exported = export_collections(&store).await.unwrap();

        assert_eq!(exported.len(), 5);
        assert_eq!(exported["skills"], vec![json!({"id": 1, "name": "Rust"})]);
        assert!(exported["media"].is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migration-data.json");
        write_export(&path, &exported).await.unwrap();
        let written: Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(written["users"][0]["email"], json!("me@example.com"));
    }
}
