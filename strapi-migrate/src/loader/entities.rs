//! Entity loader.
//!
//! Builds the in-memory entity lookup keyed by `type:id` and the documentId
//! index used to connect translations.

use std::collections::HashMap;

use migrate_shared::{Entity, EntityKey, EntityKind};
use tokio::io::AsyncBufRead;

use super::jsonl::{read_records, LineStats};

/// All entities of an export, in file order.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    positions: HashMap<EntityKey, usize>,
    documents: HashMap<String, Vec<EntityKey>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. A repeated key replaces the earlier data but keeps
    /// its position. Returns true for a new key.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let key = entity.key();

        if let Some(doc_id) = entity.document_id() {
            let keys = self.documents.entry(doc_id.to_string()).or_default();
            if !keys.contains(&key) {
                keys.push(key.clone());
            }
        }

        match self.positions.get(&key) {
            Some(&pos) => {
                let previous = std::mem::replace(&mut self.entities[pos], entity);
                let current = self.entities[pos].document_id();
                if let Some(old_doc) = previous.document_id().filter(|d| Some(*d) != current) {
                    if let Some(keys) = self.documents.get_mut(old_doc) {
                        keys.retain(|k| k != &key);
                    }
                }
                false
            }
            None => {
                self.positions.insert(key, self.entities.len());
                self.entities.push(entity);
                true
            }
        }
    }

    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.positions.get(key).map(|&pos| &self.entities[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Entities of one kind, in file order.
    pub fn of_kind<'a>(&'a self, kind: &'a EntityKind) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| &e.kind == kind)
    }

    /// Every entity key carrying `document_id`.
    pub fn by_document(&self, document_id: &str) -> &[EntityKey] {
        self.documents
            .get(document_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Translations of `key` found through a documentId: same kind, other entity.
    pub fn document_siblings(&self, key: &EntityKey, document_id: &str) -> Vec<EntityKey> {
        self.by_document(document_id)
            .iter()
            .filter(|k| k.kind == key.kind && *k != key)
            .cloned()
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Load entity lines from `reader` into `store`.
pub async fn load_entities<R>(
    reader: R,
    source: &str,
    store: &mut EntityStore,
) -> std::io::Result<LineStats>
where
    R: AsyncBufRead + Unpin,
{
    read_records(reader, source, |entity: Entity| {
        store.insert(entity);
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENTITIES: &str = r#"{"type":"api::skill-category.skill-category","id":1,"data":{"name":"Languages","order":1,"locale":"en","documentId":"doc1"}}
{"type":"api::skill-category.skill-category","id":2,"data":{"name":"Sprachen","order":1,"locale":"de","documentId":"doc1"}}

{"type":"api::skill.skill","id":1,"data":{"name":"Rust","level":5,"locale":"en"}}
{"type":"api::skill.skill","id":
"#;

    #[tokio::test]
    async fn test_load_entities() {
        let mut store = EntityStore::new();
        let stats = load_entities(ENTITIES.as_bytes(), "entities", &mut store)
            .await
            .unwrap();

        assert_eq!(stats.parsed, 3);
        assert_eq!(stats.malformed, 1);
        assert_eq!(store.len(), 3);

        let key = EntityKey::new(EntityKind::SkillCategory, 2);
        let entity = store.get(&key).unwrap();
        assert_eq!(
            serde_json::Value::Object(entity.data.clone()),
            json!({"name":"Sprachen","order":1,"locale":"de","documentId":"doc1"})
        );

        assert_eq!(store.by_document("doc1").len(), 2);
        assert_eq!(
            store.document_siblings(&key, "doc1"),
            vec![EntityKey::new(EntityKind::SkillCategory, 1)]
        );
        // Skill 1 and category 1 share a numeric id but not a key.
        assert!(store
            .get(&EntityKey::new(EntityKind::Skill, 1))
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_key_replaces_in_place() {
        let input = r#"{"type":"api::skill.skill","id":1,"data":{"name":"Old","documentId":"a"}}
{"type":"api::skill.skill","id":2,"data":{"name":"Other"}}
{"type":"api::skill.skill","id":1,"data":{"name":"New","documentId":"b"}}
"#;
        let mut store = EntityStore::new();
        load_entities(input.as_bytes(), "entities", &mut store)
            .await
            .unwrap();

        let names: Vec<String> = store.iter().map(Entity::label).collect();
        assert_eq!(names, vec!["New".to_string(), "Other".to_string()]);
        assert!(store.by_document("a").is_empty());
        assert_eq!(store.by_document("b").len(), 1);
    }
}
