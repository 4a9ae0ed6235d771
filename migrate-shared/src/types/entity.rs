//! Entity records of the Strapi export.
//!
//! Every line of an `entities_*.jsonl` file holds one content record:
//! `{"type": "api::skill.skill", "id": 3, "data": { ... }}`. The `type` string
//! is mapped onto [`EntityKind`]; unknown types are kept verbatim so that links
//! pointing at them still resolve to a stable key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const UPLOAD_TYPE: &str = "plugin::upload.file";
const SKILL_CATEGORY_TYPE: &str = "api::skill-category.skill-category";
const SKILL_TYPE: &str = "api::skill.skill";
const SOFTWARE_PROJECT_TYPE: &str = "api::software-project.software-project";

/// Content type of an exported entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// An uploaded file (`plugin::upload.file`).
    Upload,
    /// `api::skill-category.skill-category`
    SkillCategory,
    /// `api::skill.skill`
    Skill,
    /// `api::software-project.software-project`
    SoftwareProject,
    /// Any other type string found in the export.
    Other(String),
}

impl EntityKind {
    /// Map a Strapi type string onto a kind.
    pub fn parse(type_name: &str) -> Self {
        match type_name {
            UPLOAD_TYPE => Self::Upload,
            SKILL_CATEGORY_TYPE => Self::SkillCategory,
            SKILL_TYPE => Self::Skill,
            SOFTWARE_PROJECT_TYPE => Self::SoftwareProject,
            other => Self::Other(other.to_string()),
        }
    }

    /// The Strapi type string for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Upload => UPLOAD_TYPE,
            Self::SkillCategory => SKILL_CATEGORY_TYPE,
            Self::Skill => SKILL_TYPE,
            Self::SoftwareProject => SOFTWARE_PROJECT_TYPE,
            Self::Other(type_name) => type_name,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an entity for the duration of a migration: `type:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: i64,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Build a key from a raw type string, as found on link ends.
    pub fn from_type(type_name: &str, id: i64) -> Self {
        Self::new(EntityKind::parse(type_name), id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A single exported content record.
///
/// `data` holds the scalar fields of the content type (name, title, slug,
/// level, locale, documentId, ...) exactly as they appeared in the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntity", into = "RawEntity")]
pub struct Entity {
    pub kind: EntityKind,
    pub id: i64,
    pub data: Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct RawEntity {
    #[serde(rename = "type")]
    type_name: String,
    id: i64,
    data: Map<String, Value>,
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        Self {
            kind: EntityKind::parse(&raw.type_name),
            id: raw.id,
            data: raw.data,
        }
    }
}

impl From<Entity> for RawEntity {
    fn from(entity: Entity) -> Self {
        Self {
            type_name: entity.kind.as_str().to_string(),
            id: entity.id,
            data: entity.data,
        }
    }
}

impl Entity {
    pub fn new(kind: EntityKind, id: i64, data: Map<String, Value>) -> Self {
        Self { kind, id, data }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind.clone(), self.id)
    }

    /// Raw field value, if present and not null.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }

    /// String field value, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn locale(&self) -> Option<&str> {
        self.str_field("locale")
    }

    /// Cross-locale grouping identifier shared by all translations of one document.
    pub fn document_id(&self) -> Option<&str> {
        self.str_field("documentId")
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locale() == Some(locale)
    }

    /// Human-readable label for log lines: name, title or the key.
    pub fn label(&self) -> String {
        self.str_field("name")
            .or_else(|| self.str_field("title"))
            .map(str::to_string)
            .unwrap_or_else(|| self.key().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_and_unknown_kinds() {
        assert_eq!(EntityKind::parse("api::skill.skill"), EntityKind::Skill);
        assert_eq!(EntityKind::parse("plugin::upload.file"), EntityKind::Upload);

        let other = EntityKind::parse("admin::user");
        assert_eq!(other, EntityKind::Other("admin::user".to_string()));
        assert_eq!(other.as_str(), "admin::user");
    }

    #[test]
    fn test_deserialize_entity_line() {
        let line = r#"{"type":"api::skill-category.skill-category","id":1,"data":{"name":"Languages","order":1,"locale":"en","documentId":"doc1"}}"#;
        let entity: Entity = serde_json::from_str(line).unwrap();

        assert_eq!(entity.kind, EntityKind::SkillCategory);
        assert_eq!(entity.id, 1);
        assert_eq!(entity.locale(), Some("en"));
        assert_eq!(entity.document_id(), Some("doc1"));
        assert_eq!(entity.data.get("order"), Some(&json!(1)));
        assert_eq!(
            entity.key().to_string(),
            "api::skill-category.skill-category:1"
        );
    }

    #[test]
    fn test_data_must_be_an_object() {
        let line = r#"{"type":"api::skill.skill","id":1,"data":"nope"}"#;
        assert!(serde_json::from_str::<Entity>(line).is_err());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let entity: Entity = serde_json::from_value(json!({
            "type": "api::skill.skill",
            "id": 4,
            "data": { "name": null, "title": "Rust" }
        }))
        .unwrap();

        assert!(entity.field("name").is_none());
        assert_eq!(entity.label(), "Rust");
    }
}
