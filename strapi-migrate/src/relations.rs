// Relationship index built from the link export
use std::collections::HashMap;

use migrate_shared::EntityKey;

/// Entity key → field name → ordered target keys.
///
/// Several targets under one field are kept together in arrival order, which
/// is what one-to-many fields such as a project gallery rely on.
#[derive(Debug, Default, Clone)]
pub struct RelationIndex {
    relations: HashMap<EntityKey, HashMap<String, Vec<EntityKey>>>,
    edges: usize,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source.field → target`.
    pub fn add(&mut self, source: EntityKey, field: &str, target: EntityKey) {
        self.relations
            .entry(source)
            .or_default()
            .entry(field.to_string())
            .or_default()
            .push(target);
        self.edges += 1;
    }

    /// Record `source.field → target` unless that exact edge already exists.
    pub fn add_unique(&mut self, source: EntityKey, field: &str, target: EntityKey) -> bool {
        if self.get(&source, field).contains(&target) {
            return false;
        }
        self.add(source, field, target);
        true
    }

    /// Targets of `source.field`, empty when there are none.
    pub fn get(&self, source: &EntityKey, field: &str) -> &[EntityKey] {
        self.relations
            .get(source)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, source: &EntityKey, field: &str) -> Option<&EntityKey> {
        self.get(source, field).first()
    }

    /// Number of recorded edges.
    pub fn len(&self) -> usize {
        self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges == 0
    }
}
