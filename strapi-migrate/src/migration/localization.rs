//! Localization pass.
//!
//! A translated entity never becomes a record of its own. Its fields are
//! written, under its locale, onto the record created for its default-locale
//! counterpart. Relationship fields are resolved to the same destination ids
//! the default-locale record uses; one that does not resolve is left out so
//! it cannot clear the shared value.

use content_store::{Collection, ContentStore, DocumentId};
use migrate_shared::{Entity, EntityKind};
use serde_json::{Map, Value};
use tracing::{error, info, instrument};

use super::fields::{copy_fields, CATEGORY_FIELDS, SKILL_CATEGORY, SKILL_FIELDS};
use super::projects::project_data;
use super::report::{EntityOutcome, SkipReason};
use super::run::MigrationRun;

/// Apply every non-default-locale category, skill and project.
#[instrument(skip_all, fields(default_locale = %run.default_locale))]
pub async fn localize_all(store: &dyn ContentStore, run: &mut MigrationRun) {
    for kind in [
        EntityKind::SkillCategory,
        EntityKind::Skill,
        EntityKind::SoftwareProject,
    ] {
        localize_kind(store, run, &kind).await;
    }
}

async fn localize_kind(store: &dyn ContentStore, run: &mut MigrationRun, kind: &EntityKind) {
    let Some(collection) = run.ids.for_kind(kind).map(|m| m.collection()) else {
        return;
    };

    let mut localized = 0;
    for entity in run.entities_of(kind) {
        let Some(locale) = entity.locale().map(str::to_string) else {
            continue;
        };
        if locale == run.default_locale {
            continue;
        }

        let key = entity.key();
        let target = run
            .ids
            .for_kind(kind)
            .and_then(|map| run.default_counterpart_id(&key, map));
        let Some(target) = target else {
            info!(
                entity = %key,
                locale = %locale,
                "No default-locale record for {}, dropping translation",
                entity.label()
            );
            run.report
                .record(key, EntityOutcome::Skipped(SkipReason::NoDefaultCounterpart));
            continue;
        };

        let data = localized_data(run, &entity);
        let outcome = apply(store, collection, &target, &data, &locale, &entity).await;
        if matches!(outcome, EntityOutcome::Localized(_)) {
            localized += 1;
        }
        run.report.record(key, outcome);
    }

    info!("✓ Localized {} {} entities", localized, collection);
}

/// Field values written for a translated entity.
pub fn localized_data(run: &MigrationRun, entity: &Entity) -> Map<String, Value> {
    match entity.kind {
        EntityKind::SkillCategory => copy_fields(entity, CATEGORY_FIELDS),
        EntityKind::Skill => {
            let mut data = copy_fields(entity, SKILL_FIELDS);
            let category = run
                .relations
                .first(&entity.key(), SKILL_CATEGORY)
                .and_then(|linked| run.canonical_id(linked, &run.ids.skill_categories));
            if let Some(category) = category {
                data.insert(SKILL_CATEGORY.to_string(), Value::from(category));
            }
            data
        }
        EntityKind::SoftwareProject => {
            let counterpart = run
                .default_counterpart(&entity.key())
                .and_then(|k| run.entities.get(&k));
            project_data(run, entity, counterpart, false)
        }
        EntityKind::Upload | EntityKind::Other(_) => Map::new(),
    }
}

async fn apply(
    store: &dyn ContentStore,
    collection: Collection,
    target: &DocumentId,
    data: &Map<String, Value>,
    locale: &str,
    entity: &Entity,
) -> EntityOutcome {
    match store.update(collection, target, data, Some(locale)).await {
        Ok(doc) => {
            info!(
                legacy_id = entity.id,
                id = %doc.id,
                locale = locale,
                "Localized {}: {}",
                collection,
                entity.label()
            );
            EntityOutcome::Localized(doc.id)
        }
        Err(e) => {
            error!(
                legacy_id = entity.id,
                id = %target,
                locale = locale,
                error = %e,
                "Failed to localize {} {}",
                collection,
                entity.label()
            );
            EntityOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_store::MockContentStore;
    use migrate_shared::EntityKey;
    use serde_json::json;

    use crate::loader::{load_entities, load_links, EntityStore, LoadedExport};
    use crate::migration::skills::{migrate_skill_categories, migrate_skills};
    use crate::relations::RelationIndex;

    const ENTITIES: &str = r#"{"type":"api::skill-category.skill-category","id":1,"data":{"name":"Languages","order":1,"locale":"en","documentId":"cat"}}
{"type":"api::skill-category.skill-category","id":2,"data":{"name":"Sprachen","order":1,"locale":"de","documentId":"cat"}}
{"type":"api::skill.skill","id":3,"data":{"name":"Rust","level":5,"locale":"en","documentId":"rust"}}
{"type":"api::skill.skill","id":4,"data":{"name":"Rust (de)","level":5,"locale":"de","documentId":"rust"}}
{"type":"api::skill.skill","id":5,"data":{"name":"Waise","level":1,"locale":"de","documentId":"orphan"}}
"#;

    const LINKS: &str = r#"{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":3,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":1,"field":"skills"}}
{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":4,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":2,"field":"skills"}}
{"kind":"relation.circular","left":{"type":"api::skill.skill","ref":4,"field":"localizations"},"right":{"ref":"rust"}}
"#;

    async fn run() -> MigrationRun {
        let mut entities = EntityStore::new();
        load_entities(ENTITIES.as_bytes(), "entities", &mut entities)
            .await
            .unwrap();
        let mut relations = RelationIndex::new();
        load_links(LINKS.as_bytes(), "links", &entities, &mut relations)
            .await
            .unwrap();
        MigrationRun::new(
            LoadedExport {
                entities,
                relations,
                summary: Default::default(),
            },
            "en",
        )
    }

    #[tokio::test]
    async fn test_translations_update_default_records() {
        let store = MockContentStore::new("en");
        let mut run = run().await;
        migrate_skill_categories(&store, &mut run).await;
        migrate_skills(&store, &mut run).await;

        localize_all(&store, &mut run).await;

        assert_eq!(store.count(Collection::SkillCategories), 1);
        assert_eq!(store.count(Collection::Skills), 1);

        let category = run.ids.skill_categories.get(1).unwrap().clone();
        let german = store
            .locale_fields(Collection::SkillCategories, &category, "de")
            .unwrap();
        assert_eq!(german.get("name"), Some(&json!("Sprachen")));

        let skill = run.ids.skills.get(3).unwrap();
        let german = store.locale_fields(Collection::Skills, skill, "de").unwrap();
        assert_eq!(german.get("name"), Some(&json!("Rust (de)")));
        assert_eq!(german.get("skill_category"), Some(&Value::from(&category)));

        assert_eq!(
            run.report.outcome(&EntityKey::new(EntityKind::Skill, 5)),
            Some(&EntityOutcome::Skipped(SkipReason::NoDefaultCounterpart))
        );
        assert!(matches!(
            run.report.outcome(&EntityKey::new(EntityKind::SkillCategory, 2)),
            Some(EntityOutcome::Localized(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_update_is_recorded() {
        let store = MockContentStore::new("en");
        store.reject_when(Collection::SkillCategories, "name", "Sprachen");
        let mut run = run().await;
        migrate_skill_categories(&store, &mut run).await;

        localize_all(&store, &mut run).await;

        assert!(matches!(
            run.report.outcome(&EntityKey::new(EntityKind::SkillCategory, 2)),
            Some(EntityOutcome::Failed(_))
        ));
        let category = run.ids.skill_categories.get(1).unwrap();
        assert!(store
            .locale_fields(Collection::SkillCategories, category, "de")
            .is_none());
    }
}
