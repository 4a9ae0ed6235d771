// Pre-migration wipe of the collections the run recreates
use content_store::{Collection, ContentStore, Filter};
use tracing::{error, info, instrument};

use super::report::MigrationReport;

/// Cleared before writing, dependents first. Media are kept so uploads can be
/// reused across runs.
pub const WIPED_COLLECTIONS: [Collection; 3] = [
    Collection::SoftwareProjects,
    Collection::Skills,
    Collection::SkillCategories,
];

/// Delete every record of the wiped collections. A failure is logged and
/// recorded; the remaining collections are still cleared.
#[instrument(skip_all)]
pub async fn wipe_collections(store: &dyn ContentStore, report: &mut MigrationReport) {
    for collection in WIPED_COLLECTIONS {
        match store.delete(collection, &Filter::All).await {
            Ok(deleted) => {
                info!(collection = %collection, deleted = deleted, "Collection cleared");
                report.wiped.push((collection, deleted));
            }
            Err(e) => {
                error!(collection = %collection, error = %e, "Failed to clear collection");
                report.wipe_failures.push((collection, e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_store::MockContentStore;
    use serde_json::{json, Map, Value};

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_wipe_keeps_media() {
        let store = MockContentStore::new("en");
        store.seed(Collection::Skills, data(json!({"name": "Rust"})));
        store.seed(Collection::Skills, data(json!({"name": "Go"})));
        store.seed(Collection::SkillCategories, data(json!({"name": "Languages"})));
        store.seed(Collection::Media, data(json!({"alt": "Logo"})));

        let mut report = MigrationReport::default();
        wipe_collections(&store, &mut report).await;

        assert_eq!(store.count(Collection::Skills), 0);
        assert_eq!(store.count(Collection::SkillCategories), 0);
        assert_eq!(store.count(Collection::Media), 1);
        assert_eq!(
            report.wiped,
            vec![
                (Collection::SoftwareProjects, 0),
                (Collection::Skills, 2),
                (Collection::SkillCategories, 1),
            ]
        );
        assert!(report.wipe_failures.is_empty());
    }
}
