// Skill categories, skills and the category → skills back-fill
use std::collections::HashMap;

use content_store::{Collection, ContentStore, DocumentId};
use migrate_shared::EntityKind;
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::fields::{
    copy_fields, CATEGORY_FIELDS, CATEGORY_SKILLS, SKILL_CATEGORY, SKILL_FIELDS, SVG_ICON,
};
use super::report::{BackfillSummary, EntityOutcome, SkipReason};
use super::run::MigrationRun;

/// Create a destination category for every default-locale category.
#[instrument(skip_all)]
pub async fn migrate_skill_categories(store: &dyn ContentStore, run: &mut MigrationRun) {
    for entity in run.entities_of(&EntityKind::SkillCategory) {
        if entity.locale().is_none() {
            warn!(legacy_id = entity.id, "Category has no locale, skipping");
            run.report
                .record(entity.key(), EntityOutcome::Skipped(SkipReason::NoLocale));
            continue;
        }
        if !run.is_default_locale(&entity) {
            continue;
        }

        let data = copy_fields(&entity, CATEGORY_FIELDS);
        match store.create(Collection::SkillCategories, &data).await {
            Ok(doc) => {
                info!(legacy_id = entity.id, id = %doc.id, "Migrated category: {}", entity.label());
                run.ids.skill_categories.insert(entity.id, doc.id.clone());
                run.report.record(entity.key(), EntityOutcome::Created(doc.id));
            }
            Err(e) => {
                error!(
                    legacy_id = entity.id,
                    error = %e,
                    "Failed to migrate category {}",
                    entity.label()
                );
                run.report
                    .record(entity.key(), EntityOutcome::Failed(e.to_string()));
            }
        }
    }

    info!(
        "✓ Skill categories mapped: {:?}",
        run.ids.skill_categories.legacy_ids()
    );
}

/// Create a destination skill for every default-locale skill.
///
/// Returns `(skill id, category id)` for each created skill, in creation order.
#[instrument(skip_all)]
pub async fn migrate_skills(
    store: &dyn ContentStore,
    run: &mut MigrationRun,
) -> Vec<(DocumentId, Option<DocumentId>)> {
    let mut created = Vec::new();

    for entity in run.entities_of(&EntityKind::Skill) {
        if entity.locale().is_none() {
            warn!(legacy_id = entity.id, "Skill has no locale, skipping");
            run.report
                .record(entity.key(), EntityOutcome::Skipped(SkipReason::NoLocale));
            continue;
        }
        if !run.is_default_locale(&entity) {
            continue;
        }

        let key = entity.key();
        let category_id = run.resolve_one(&key, SKILL_CATEGORY, &run.ids.skill_categories);
        let icon_id = run.resolve_one(&key, SVG_ICON, &run.ids.media);

        let mut data = copy_fields(&entity, SKILL_FIELDS);
        data.insert(SKILL_CATEGORY.to_string(), optional_id(&category_id));
        data.insert(SVG_ICON.to_string(), optional_id(&icon_id));

        match store.create(Collection::Skills, &data).await {
            Ok(doc) => {
                info!(
                    legacy_id = entity.id,
                    id = %doc.id,
                    category = ?category_id,
                    "Migrated skill: {}",
                    entity.label()
                );
                run.ids.skills.insert(entity.id, doc.id.clone());
                run.report
                    .record(key, EntityOutcome::Created(doc.id.clone()));
                created.push((doc.id, category_id));
            }
            Err(e) => {
                error!(
                    legacy_id = entity.id,
                    error = %e,
                    "Failed to migrate skill {}",
                    entity.label()
                );
                run.report.record(key, EntityOutcome::Failed(e.to_string()));
            }
        }
    }

    info!("✓ Skills mapped: {}", run.ids.skills.len());
    created
}

/// Group skill ids under their category id, categories in order of first
/// appearance. Skills without a category are left out.
pub fn group_skills_by_category<I>(skills: I) -> Vec<(DocumentId, Vec<DocumentId>)>
where
    I: IntoIterator<Item = (DocumentId, Option<DocumentId>)>,
{
    let mut groups: Vec<(DocumentId, Vec<DocumentId>)> = Vec::new();
    let mut positions: HashMap<DocumentId, usize> = HashMap::new();

    for (skill_id, category_id) in skills {
        let Some(category_id) = category_id else {
            continue;
        };
        match positions.get(&category_id) {
            Some(&pos) => groups[pos].1.push(skill_id),
            None => {
                positions.insert(category_id.clone(), groups.len());
                groups.push((category_id, vec![skill_id]));
            }
        }
    }
    groups
}

/// Set each category's `skills` to its complete skill list, one update per category.
#[instrument(skip_all, fields(categories = groups.len()))]
pub async fn backfill_category_skills(
    store: &dyn ContentStore,
    groups: &[(DocumentId, Vec<DocumentId>)],
) -> BackfillSummary {
    let mut summary = BackfillSummary::default();

    for (category_id, skill_ids) in groups {
        let mut data = Map::new();
        data.insert(
            CATEGORY_SKILLS.to_string(),
            Value::Array(skill_ids.iter().map(Value::from).collect()),
        );

        match store
            .update(Collection::SkillCategories, category_id, &data, None)
            .await
        {
            Ok(_) => {
                info!(id = %category_id, skills = skill_ids.len(), "Updated category skills");
                summary.updated += 1;
            }
            Err(e) => {
                error!(id = %category_id, error = %e, "Failed to update category skills");
                summary.failed += 1;
            }
        }
    }

    summary
}

pub(crate) fn optional_id(id: &Option<DocumentId>) -> Value {
    id.as_ref().map(Value::from).unwrap_or(Value::Null)
}
