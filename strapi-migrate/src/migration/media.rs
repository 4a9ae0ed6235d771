// Media migration - uploads every exported file whose bytes are on disk
use std::path::Path;

use content_store::{Collection, ContentStore, DocumentId, FileUpload, Filter};
use migrate_shared::{Entity, EntityKind};
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::fields::media_alt;
use super::report::{EntityOutcome, SkipReason};
use super::run::MigrationRun;
use crate::config::{asset_path, PROGRESS_REPORT_INTERVAL};

/// Upload media files, reusing a destination record with the same alt text.
///
/// A file missing from `assets_dir` is skipped; it gets no id mapping and
/// every relationship pointing at it resolves to nothing.
#[instrument(skip_all)]
pub async fn migrate_media(store: &dyn ContentStore, run: &mut MigrationRun, assets_dir: &Path) {
    let uploads = run.entities_of(&EntityKind::Upload);
    info!("Migrating {} media entities...", uploads.len());

    for (i, entity) in uploads.iter().enumerate() {
        let outcome = migrate_file(store, entity, assets_dir).await;
        if let Some(id) = outcome.document_id() {
            run.ids.media.insert(entity.id, id.clone());
        }
        run.report.record(entity.key(), outcome);

        if (i + 1) % PROGRESS_REPORT_INTERVAL == 0 {
            info!("Processed {}/{} media entities", i + 1, uploads.len());
        }
    }

    info!("✓ Media mapped: {}", run.ids.media.len());
}

async fn migrate_file(
    store: &dyn ContentStore,
    entity: &Entity,
    assets_dir: &Path,
) -> EntityOutcome {
    let Some(hash) = entity.str_field("hash") else {
        warn!(legacy_id = entity.id, "Upload has no hash, skipping");
        return EntityOutcome::Skipped(SkipReason::MissingHash);
    };
    let ext = entity.str_field("ext").unwrap_or_default();
    let path = asset_path(assets_dir, hash, ext);

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        info!(legacy_id = entity.id, file = %path.display(), "Backing file missing, skipping");
        return EntityOutcome::Skipped(SkipReason::MissingFile);
    }

    let alt = media_alt(entity);
    if let Some(alt) = &alt {
        match find_by_alt(store, alt).await {
            Ok(Some(id)) => {
                info!(legacy_id = entity.id, id = %id, "Reusing existing media: {}", alt);
                return EntityOutcome::Reused(id);
            }
            Ok(None) => {}
            Err(e) => {
                error!(legacy_id = entity.id, error = %e, "Failed to look up media: {}", alt);
                return EntityOutcome::Failed(e.to_string());
            }
        }
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(
                legacy_id = entity.id,
                file = %path.display(),
                error = %e,
                "Failed to read media file"
            );
            return EntityOutcome::Failed(e.to_string());
        }
    };

    let name = entity
        .str_field("name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", hash, ext));
    let file = FileUpload::new(
        name.clone(),
        entity.str_field("mime").map(str::to_string),
        bytes,
    );

    let mut data = Map::new();
    if let Some(alt) = alt {
        data.insert("alt".to_string(), Value::String(alt));
    }

    match store.upload(Collection::Media, &data, &file).await {
        Ok(doc) => {
            info!(legacy_id = entity.id, id = %doc.id, "Migrated media: {}", name);
            EntityOutcome::Created(doc.id)
        }
        Err(e) => {
            error!(legacy_id = entity.id, error = %e, "Failed to migrate media {}", name);
            EntityOutcome::Failed(e.to_string())
        }
    }
}

async fn find_by_alt(
    store: &dyn ContentStore,
    alt: &str,
) -> Result<Option<DocumentId>, content_store::ContentStoreError> {
    let docs = store
        .find(Collection::Media, &Filter::equals("alt", alt), None)
        .await?;
    Ok(docs.into_iter().next().map(|doc| doc.id))
}
