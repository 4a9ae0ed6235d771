// Software project migration
use std::collections::HashMap;

use content_store::{Collection, ContentStore, DocumentId};
use migrate_shared::{Entity, EntityKind};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::fields::{copy_fields, COVER_IMAGE, GALLERY, PROJECT_FIELDS};
use super::report::{EntityOutcome, SkipReason};
use super::run::MigrationRun;
use super::skills::optional_id;

/// Create a destination project for every default-locale project.
///
/// Projects are deduplicated by slug: a slug counts as processed as soon as
/// its first project is attempted, and later projects with the same slug map
/// onto the record created for it instead of creating another one.
#[instrument(skip_all)]
pub async fn migrate_projects(store: &dyn ContentStore, run: &mut MigrationRun) {
    let mut slugs: HashMap<String, Option<DocumentId>> = HashMap::new();

    for entity in run.entities_of(&EntityKind::SoftwareProject) {
        let key = entity.key();
        if entity.locale().is_none() {
            warn!(legacy_id = entity.id, "Project has no locale, skipping");
            run.report
                .record(key, EntityOutcome::Skipped(SkipReason::NoLocale));
            continue;
        }
        if !run.is_default_locale(&entity) {
            continue;
        }

        let slug = entity.str_field("slug").map(str::to_string);
        if let Some(slug) = &slug {
            if let Some(existing) = slugs.get(slug) {
                let outcome = match existing {
                    Some(id) => {
                        info!(
                            legacy_id = entity.id,
                            id = %id,
                            "Mapped duplicate project {} to existing record",
                            entity.label()
                        );
                        run.ids.projects.insert(entity.id, id.clone());
                        EntityOutcome::MappedToDuplicate(id.clone())
                    }
                    None => {
                        warn!(
                            legacy_id = entity.id,
                            slug = %slug,
                            "Duplicate of a failed project, skipping"
                        );
                        EntityOutcome::Skipped(SkipReason::DuplicateSlug)
                    }
                };
                run.report.record(key, outcome);
                continue;
            }
            slugs.insert(slug.clone(), None);
        }

        let data = project_data(run, &entity, None, true);
        match store.create(Collection::SoftwareProjects, &data).await {
            Ok(doc) => {
                info!(legacy_id = entity.id, id = %doc.id, "Migrated project: {}", entity.label());
                run.ids.projects.insert(entity.id, doc.id.clone());
                if let Some(slug) = slug {
                    slugs.insert(slug, Some(doc.id.clone()));
                }
                run.report.record(key, EntityOutcome::Created(doc.id));
            }
            Err(e) => {
                error!(
                    legacy_id = entity.id,
                    error = %e,
                    "Failed to migrate project {}",
                    entity.label()
                );
                run.report.record(key, EntityOutcome::Failed(e.to_string()));
            }
        }
    }

    info!("✓ Projects mapped: {:?}", run.ids.projects.legacy_ids());
}

/// Field values of a project document.
///
/// Media come from `entity`'s own links; when it has none for a field,
/// `fallback`'s links are used. With `null_unresolved` an unresolved cover
/// image is sent as null, otherwise it is left out. The gallery is only
/// sent when at least one image resolved.
pub(crate) fn project_data(
    run: &MigrationRun,
    entity: &Entity,
    fallback: Option<&Entity>,
    null_unresolved: bool,
) -> Map<String, Value> {
    let key = entity.key();
    let fallback_key = fallback.map(Entity::key);

    let cover = run
        .resolve_one(&key, COVER_IMAGE, &run.ids.media)
        .or_else(|| {
            fallback_key
                .as_ref()
                .and_then(|k| run.resolve_one(k, COVER_IMAGE, &run.ids.media))
        });

    let mut gallery = run.resolve_many(&key, GALLERY, &run.ids.media);
    if gallery.is_empty() {
        if let Some(k) = &fallback_key {
            gallery = run.resolve_many(k, GALLERY, &run.ids.media);
        }
    }

    let mut data = copy_fields(entity, PROJECT_FIELDS);
    if cover.is_some() || null_unresolved {
        data.insert(COVER_IMAGE.to_string(), optional_id(&cover));
    }
    if !gallery.is_empty() {
        data.insert(
            GALLERY.to_string(),
            Value::Array(gallery.iter().map(Value::from).collect()),
        );
    }
    data
}
