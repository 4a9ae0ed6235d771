// State of one migration run, shared by every phase
use content_store::DocumentId;
use migrate_shared::{Entity, EntityKey, EntityKind, LOCALIZATIONS_FIELD};

use super::report::MigrationReport;
use crate::id_map::{IdMap, IdMaps};
use crate::loader::{EntityStore, LoadedExport};
use crate::relations::RelationIndex;

/// Entities, relationships, id maps and report of a single run.
///
/// Phases borrow the run mutably one after another; nothing here is shared
/// between runs.
#[derive(Debug)]
pub struct MigrationRun {
    pub entities: EntityStore,
    pub relations: RelationIndex,
    pub ids: IdMaps,
    pub default_locale: String,
    pub report: MigrationReport,
}

impl MigrationRun {
    pub fn new(export: LoadedExport, default_locale: impl Into<String>) -> Self {
        Self {
            entities: export.entities,
            relations: export.relations,
            ids: IdMaps::new(),
            default_locale: default_locale.into(),
            report: MigrationReport::new(export.summary),
        }
    }

    /// Entities of `kind` in export order, cloned so phases can mutate the run
    /// while walking them.
    pub fn entities_of(&self, kind: &EntityKind) -> Vec<Entity> {
        self.entities.of_kind(kind).cloned().collect()
    }

    pub fn is_default_locale(&self, entity: &Entity) -> bool {
        entity.has_locale(&self.default_locale)
    }

    /// Destination id of the first `field` target of `key`.
    pub fn resolve_one(&self, key: &EntityKey, field: &str, map: &IdMap) -> Option<DocumentId> {
        self.relations
            .first(key, field)
            .and_then(|target| map.resolve(target))
            .cloned()
    }

    /// Destination ids of every resolvable `field` target of `key`, in link order.
    pub fn resolve_many(&self, key: &EntityKey, field: &str, map: &IdMap) -> Vec<DocumentId> {
        self.relations
            .get(key, field)
            .iter()
            .filter_map(|target| map.resolve(target))
            .cloned()
            .collect()
    }

    /// The default-locale translation of `key`.
    ///
    /// Localization links are consulted first. When none of them leads to a
    /// default-locale entity, entities of the same kind sharing the documentId
    /// are tried.
    pub fn default_counterpart(&self, key: &EntityKey) -> Option<EntityKey> {
        let linked = self
            .relations
            .get(key, LOCALIZATIONS_FIELD)
            .iter()
            .find(|target| self.is_default_key(target))
            .cloned();
        if linked.is_some() {
            return linked;
        }

        let document_id = self.entities.get(key)?.document_id()?;
        self.entities
            .document_siblings(key, document_id)
            .into_iter()
            .find(|sibling| self.is_default_key(sibling))
    }

    /// Destination id created for the default-locale translation of `key`.
    pub fn default_counterpart_id(&self, key: &EntityKey, map: &IdMap) -> Option<DocumentId> {
        let counterpart = self.default_counterpart(key)?;
        map.resolve(&counterpart).cloned()
    }

    /// Destination id for `key` itself when it is in the default locale,
    /// otherwise for its default-locale counterpart.
    pub fn canonical_id(&self, key: &EntityKey, map: &IdMap) -> Option<DocumentId> {
        if self.is_default_key(key) {
            return map.resolve(key).cloned();
        }
        self.default_counterpart_id(key, map)
    }

    fn is_default_key(&self, key: &EntityKey) -> bool {
        self.entities
            .get(key)
            .map(|e| self.is_default_locale(e))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_entities, load_links};

    const ENTITIES: &str = r#"{"type":"api::skill-category.skill-category","id":1,"data":{"name":"Languages","locale":"en","documentId":"doc1"}}
{"type":"api::skill-category.skill-category","id":2,"data":{"name":"Sprachen","locale":"de","documentId":"doc1"}}
{"type":"api::skill-category.skill-category","id":3,"data":{"name":"Tools","locale":"en","documentId":"doc2"}}
{"type":"api::skill-category.skill-category","id":4,"data":{"name":"Werkzeuge","locale":"de","documentId":"doc2"}}
{"type":"api::skill.skill","id":5,"data":{"name":"Rust","locale":"de"}}
"#;

    const LINKS: &str = r#"{"kind":"relation.circular","left":{"type":"api::skill-category.skill-category","ref":2,"field":"localizations"},"right":{"ref":"doc1"}}
{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":5,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":2}}
{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":5,"field":"gallery"},"right":{"type":"plugin::upload.file","ref":8}}
{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":5,"field":"gallery"},"right":{"type":"plugin::upload.file","ref":9}}
"#;

    fn category(id: i64) -> EntityKey {
        EntityKey::new(EntityKind::SkillCategory, id)
    }

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
    async fn test_counterpart_via_link_and_document_id() {
        let run = run().await;
        assert_eq!(run.default_counterpart(&category(2)), Some(category(1)));
        // No link record for doc2; found through the documentId.
        assert_eq!(run.default_counterpart(&category(4)), Some(category(3)));
        assert_eq!(run.default_counterpart(&category(1)), None);
    }

    #[tokio::test]
    async fn test_resolve_through_id_maps() {
        let mut run = run().await;
        run.ids.skill_categories.insert(1, DocumentId::Number(10));
        run.ids.media.insert(9, DocumentId::Number(90));

        let skill = EntityKey::new(EntityKind::Skill, 5);
        let linked = run.relations.first(&skill, "skill_category").cloned().unwrap();
        assert_eq!(
            run.canonical_id(&linked, &run.ids.skill_categories),
            Some(DocumentId::Number(10))
        );
        assert_eq!(
            run.canonical_id(&category(1), &run.ids.skill_categories),
            Some(DocumentId::Number(10))
        );
        assert_eq!(
            run.resolve_many(&skill, "gallery", &run.ids.media),
            vec![DocumentId::Number(90)]
        );
        assert_eq!(run.resolve_one(&skill, "gallery", &run.ids.media), None);
    }
}
