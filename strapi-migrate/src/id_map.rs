// Legacy id → destination id tables, one per destination collection
use std::collections::HashMap;

use content_store::{Collection, DocumentId};
use migrate_shared::{EntityKey, EntityKind};

/// Mapping from legacy numeric id to the id of the destination record.
///
/// Entries are written at most once: the first successful creation wins and
/// later inserts for the same legacy id are refused.
#[derive(Debug, Clone)]
pub struct IdMap {
    kind: EntityKind,
    collection: Collection,
    entries: HashMap<i64, DocumentId>,
}

impl IdMap {
    pub fn new(kind: EntityKind, collection: Collection) -> Self {
        Self {
            kind,
            collection,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Record `legacy_id → id`. Returns false if the legacy id was already mapped.
    pub fn insert(&mut self, legacy_id: i64, id: DocumentId) -> bool {
        use std::collections::hash_map::Entry;

        match self.entries.entry(legacy_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    pub fn get(&self, legacy_id: i64) -> Option<&DocumentId> {
        self.entries.get(&legacy_id)
    }

    /// Destination id for an entity key; keys of another kind never resolve.
    pub fn resolve(&self, key: &EntityKey) -> Option<&DocumentId> {
        if key.kind != self.kind {
            return None;
        }
        self.get(key.id)
    }

    pub fn contains(&self, legacy_id: i64) -> bool {
        self.entries.contains_key(&legacy_id)
    }

    /// Mapped legacy ids in ascending order.
    pub fn legacy_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The id maps of one run.
#[derive(Debug, Clone)]
pub struct IdMaps {
    pub media: IdMap,
    pub skill_categories: IdMap,
    pub skills: IdMap,
    pub projects: IdMap,
}

impl IdMaps {
    pub fn new() -> Self {
        Self {
            media: IdMap::new(EntityKind::Upload, Collection::Media),
            skill_categories: IdMap::new(EntityKind::SkillCategory, Collection::SkillCategories),
            skills: IdMap::new(EntityKind::Skill, Collection::Skills),
            projects: IdMap::new(EntityKind::SoftwareProject, Collection::SoftwareProjects),
        }
    }

    pub fn for_kind(&self, kind: &EntityKind) -> Option<&IdMap> {
        match kind {
            EntityKind::Upload => Some(&self.media),
            EntityKind::SkillCategory => Some(&self.skill_categories),
            EntityKind::Skill => Some(&self.skills),
            EntityKind::SoftwareProject => Some(&self.projects),
            EntityKind::Other(_) => None,
        }
    }
}

impl Default for IdMaps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let mut map = IdMap::new(EntityKind::Skill, Collection::Skills);
        assert!(map.insert(3, DocumentId::Number(10)));
        assert!(!map.insert(3, DocumentId::Number(11)));
        assert_eq!(map.get(3), Some(&DocumentId::Number(10)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_resolve_checks_kind() {
        let mut map = IdMap::new(EntityKind::Upload, Collection::Media);
        map.insert(5, DocumentId::from("abc"));

        assert_eq!(
            map.resolve(&EntityKey::new(EntityKind::Upload, 5)),
            Some(&DocumentId::from("abc"))
        );
        assert_eq!(map.resolve(&EntityKey::new(EntityKind::Skill, 5)), None);
        assert_eq!(map.resolve(&EntityKey::new(EntityKind::Upload, 6)), None);
    }

    #[test]
    fn test_for_kind() {
        let maps = IdMaps::new();
        assert_eq!(maps.skills.kind(), &EntityKind::Skill);
        assert_eq!(
            maps.for_kind(&EntityKind::SoftwareProject).map(IdMap::collection),
            Some(Collection::SoftwareProjects)
        );
        assert!(maps.for_kind(&EntityKind::Other("admin::user".into())).is_none());
    }
}
