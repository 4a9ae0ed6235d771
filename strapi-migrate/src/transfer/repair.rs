// Repair of the category → skills back-references from the skills themselves
use content_store::{Collection, ContentStore, DocumentId, Filter};
use tracing::{info, instrument};

use crate::errors::MigrateError;
use crate::migration::{backfill_category_skills, group_skills_by_category, BackfillSummary};

/// Read every skill and set each category's `skills` to the skills pointing
/// at it. Categories no skill points at are left untouched.
#[instrument(skip_all)]
pub async fn fix_skill_relations(
    store: &dyn ContentStore,
) -> Result<BackfillSummary, MigrateError> {
    info!("Fetching all skills...");
    let skills = store.find(Collection::Skills, &Filter::All, None).await?;
    info!("Found {} skills", skills.len());

    let groups = group_skills_by_category(skills.into_iter().map(|skill| {
        let category = skill
            .get("skill_category")
            .and_then(DocumentId::from_reference);
        (skill.id, category)
    }));

    info!("Updating {} categories...", groups.len());
    Ok(backfill_category_skills(store, &groups).await)
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
    async fn test_fix_skill_relations() {
        let store = MockContentStore::new("en");
        let languages = store.seed(Collection::SkillCategories, data(json!({"name": "Languages"})));
        let tools = store.seed(
            Collection::SkillCategories,
            data(json!({"name": "Tools", "skills": [99]})),
        );
        let rust = store.seed(
            Collection::Skills,
            data(json!({"name": "Rust", "skill_category": {"id": 1, "name": "Languages"}})),
        );
        let go = store.seed(Collection::Skills, data(json!({"name": "Go", "skill_category": 1})));
        store.seed(Collection::Skills, data(json!({"name": "Loose"})));

        let summary = fix_skill_relations(&store).await.unwrap();

        assert_eq!(summary, BackfillSummary { updated: 1, failed: 0 });
        let doc = store
            .get(Collection::SkillCategories, &languages, None)
            .unwrap();
        assert_eq!(doc.get("skills"), Some(&json!([rust, go])));
        let doc = store.get(Collection::SkillCategories, &tools, None).unwrap();
        assert_eq!(doc.get("skills"), Some(&json!([99])));
    }
}
