//! Link loader.
//!
//! Turns link records into edges of the [`RelationIndex`]. Translation links
//! name their target by documentId, which is resolved through the entity
//! store loaded beforehand.

use migrate_shared::{Link, LinkKind, LOCALIZATIONS_FIELD};
use tokio::io::AsyncBufRead;
use tracing::debug;

use super::entities::EntityStore;
use super::jsonl::{read_records, LineStats};
use crate::relations::RelationIndex;

/// What became of the link records of one load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    /// Links that produced at least one edge.
    pub recorded: usize,
    /// Links of an unknown kind, missing an end or field, or pointing at an
    /// unknown documentId.
    pub ignored: usize,
}

impl LinkStats {
    pub fn merge(&mut self, other: LinkStats) {
        self.recorded += other.recorded;
        self.ignored += other.ignored;
    }
}

/// Register the edges of one link. Returns false when the link was ignored.
pub fn apply_link(link: &Link, entities: &EntityStore, index: &mut RelationIndex) -> bool {
    match link.kind {
        LinkKind::Basic => {
            let (Some(left), Some(right)) = (link.left.entity_key(), link.right.entity_key())
            else {
                return false;
            };
            let Some(field) = link.left.field() else {
                return false;
            };
            index.add(left.clone(), field, right.clone());
            if let Some(inverse) = link.right.field() {
                index.add(right, inverse, left);
            }
            true
        }
        LinkKind::Morph => {
            let (Some(left), Some(right)) = (link.left.entity_key(), link.right.entity_key())
            else {
                return false;
            };
            let Some(field) = link.right.field() else {
                return false;
            };
            index.add(right, field, left);
            true
        }
        LinkKind::Circular if link.is_localization() => {
            let Some(left) = link.left.entity_key() else {
                return false;
            };
            let document_id = link.right.reference.as_document_id();
            let targets = entities.document_siblings(&left, &document_id);
            if targets.is_empty() {
                debug!(entity = %left, document_id = %document_id, "Localization target not found");
                return false;
            }
            for target in targets {
                index.add_unique(left.clone(), LOCALIZATIONS_FIELD, target.clone());
                index.add_unique(target, LOCALIZATIONS_FIELD, left.clone());
            }
            true
        }
        LinkKind::Circular | LinkKind::Unknown(_) => false,
    }
}

/// Load link lines from `reader` into `index`.
pub async fn load_links<R>(
    reader: R,
    source: &str,
    entities: &EntityStore,
    index: &mut RelationIndex,
) -> std::io::Result<(LineStats, LinkStats)>
where
    R: AsyncBufRead + Unpin,
{
    let mut link_stats = LinkStats::default();
    let line_stats = read_records(reader, source, |link: Link| {
        if apply_link(&link, entities, index) {
            link_stats.recorded += 1;
        } else {
            link_stats.ignored += 1;
        }
    })
    .await?;
    Ok((line_stats, link_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrate_shared::{EntityKey, EntityKind};

    use crate::loader::entities::load_entities;

    fn skill(id: i64) -> EntityKey {
        EntityKey::new(EntityKind::Skill, id)
    }

    fn category(id: i64) -> EntityKey {
        EntityKey::new(EntityKind::SkillCategory, id)
    }

    fn file(id: i64) -> EntityKey {
        EntityKey::new(EntityKind::Upload, id)
    }

    async fn entities() -> EntityStore {
        let input = r#"{"type":"api::skill-category.skill-category","id":1,"data":{"name":"Languages","locale":"en","documentId":"doc1"}}
{"type":"api::skill-category.skill-category","id":2,"data":{"name":"Sprachen","locale":"de","documentId":"doc1"}}
{"type":"api::skill.skill","id":3,"data":{"name":"Rust","locale":"en","documentId":"doc1"}}
"#;
        let mut store = EntityStore::new();
        load_entities(input.as_bytes(), "entities", &mut store)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_basic_links_are_symmetric() {
        let store = entities().await;
        let input = r#"{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":3,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":1,"field":"skills"}}
{"kind":"relation.basic","left":{"type":"api::skill.skill","ref":4,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":1}}
"#;
        let mut index = RelationIndex::new();
        let (lines, links) = load_links(input.as_bytes(), "links", &store, &mut index)
            .await
            .unwrap();

        assert_eq!(lines.parsed, 2);
        assert_eq!(links.recorded, 2);
        assert_eq!(index.get(&skill(3), "skill_category"), &[category(1)]);
        assert_eq!(index.get(&category(1), "skills"), &[skill(3)]);
        assert_eq!(index.get(&skill(4), "skill_category"), &[category(1)]);
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_morph_link_is_one_way() {
        let store = entities().await;
        let input = r#"{"kind":"relation.morph","left":{"type":"plugin::upload.file","ref":7,"field":"related"},"right":{"type":"api::skill.skill","ref":3,"field":"svgIcon"}}"#;
        let mut index = RelationIndex::new();
        load_links(input.as_bytes(), "links", &store, &mut index)
            .await
            .unwrap();

        assert_eq!(index.get(&skill(3), "svgIcon"), &[file(7)]);
        assert!(index.get(&file(7), "related").is_empty());
    }

    #[tokio::test]
    async fn test_localization_link_resolves_same_kind_only() {
        let store = entities().await;
        let input = r#"{"kind":"relation.circular","left":{"type":"api::skill-category.skill-category","ref":2,"field":"localizations"},"right":{"ref":"doc1"}}
{"kind":"relation.circular","left":{"type":"api::skill-category.skill-category","ref":1,"field":"localizations"},"right":{"ref":"doc1"}}
{"kind":"relation.circular","left":{"type":"api::skill-category.skill-category","ref":2,"field":"localizations"},"right":{"ref":"missing"}}
"#;
        let mut index = RelationIndex::new();
        let (_, links) = load_links(input.as_bytes(), "links", &store, &mut index)
            .await
            .unwrap();

        assert_eq!(links.recorded, 2);
        assert_eq!(links.ignored, 1);
        assert_eq!(index.get(&category(2), "localizations"), &[category(1)]);
        assert_eq!(index.get(&category(1), "localizations"), &[category(2)]);
        assert!(index.get(&skill(3), "localizations").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kinds_are_ignored() {
        let store = entities().await;
        let input = r#"{"kind":"relation.weird","left":{"type":"api::skill.skill","ref":3,"field":"x"},"right":{"type":"api::skill.skill","ref":4}}
{"kind":"relation.circular","left":{"type":"api::skill.skill","ref":3,"field":"parent"},"right":{"ref":"doc1"}}
"#;
        let mut index = RelationIndex::new();
        let (_, links) = load_links(input.as_bytes(), "links", &store, &mut index)
            .await
            .unwrap();

        assert_eq!(links.ignored, 2);
        assert!(index.is_empty());
    }
}
