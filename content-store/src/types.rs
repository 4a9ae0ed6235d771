//! Request and response types for content store operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ContentStoreError;

/// Destination collections known to the migrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Media,
    SkillCategories,
    Skills,
    SoftwareProjects,
}

impl Collection {
    /// The collection slug used in REST paths.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Media => "media",
            Self::SkillCategories => "skill-categories",
            Self::Skills => "skills",
            Self::SoftwareProjects => "software-projects",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "users" => Some(Self::Users),
            "media" => Some(Self::Media),
            "skill-categories" => Some(Self::SkillCategories),
            "skills" => Some(Self::Skills),
            "software-projects" => Some(Self::SoftwareProjects),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Identifier assigned by the store.
///
/// Depending on the database adapter behind the CMS this is a number or a
/// string. It serializes back to the same JSON form so that relationship
/// fields carry exactly what the store handed out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl DocumentId {
    /// Read an id from a JSON value: a bare id, or a populated relationship
    /// object carrying an `id` field.
    pub fn from_reference(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            Value::Object(obj) => obj.get("id").and_then(Self::from_reference),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        match id {
            DocumentId::Number(n) => Value::from(n),
            DocumentId::Text(s) => Value::String(s),
        }
    }
}

impl From<&DocumentId> for Value {
    fn from(id: &DocumentId) -> Self {
        id.clone().into()
    }
}

/// A record as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    /// Every field except `id`.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from a JSON object carrying an `id` field.
    pub fn from_value(value: Value) -> Result<Self, ContentStoreError> {
        let Value::Object(mut fields) = value else {
            return Err(ContentStoreError::parse("document is not a JSON object"));
        };
        let id = fields
            .remove("id")
            .as_ref()
            .and_then(DocumentId::from_reference)
            .ok_or_else(|| ContentStoreError::parse("document has no usable id"))?;
        Ok(Self { id, fields })
    }

    /// The document as one JSON object, `id` included.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::with_capacity(self.fields.len() + 1);
        obj.insert("id".to_string(), Value::from(&self.id));
        for (k, v) in &self.fields {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }
}

/// Selection of documents for `find` and `delete`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Documents whose field equals the value.
    Equals { field: String, value: Value },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluate the filter against a document's fields.
    pub fn matches(&self, id: &DocumentId, fields: &Map<String, Value>) -> bool {
        match self {
            Self::All => true,
            Self::Equals { field, value } if field == "id" => &Value::from(id) == value,
            Self::Equals { field, value } => fields.get(field) == Some(value),
        }
    }
}

/// File contents for upload collections.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_from_reference() {
        assert_eq!(DocumentId::from_reference(&json!(7)), Some(DocumentId::Number(7)));
        assert_eq!(
            DocumentId::from_reference(&json!("abc")),
            Some(DocumentId::Text("abc".to_string()))
        );
        assert_eq!(
            DocumentId::from_reference(&json!({"id": 3, "name": "Rust"})),
            Some(DocumentId::Number(3))
        );
        assert_eq!(DocumentId::from_reference(&json!(null)), None);
        assert_eq!(DocumentId::from_reference(&json!("")), None);
    }

    #[test]
    fn test_document_from_value() {
        let doc = Document::from_value(json!({"id": "64f0", "alt": "Logo"})).unwrap();
        assert_eq!(doc.id, DocumentId::Text("64f0".to_string()));
        assert_eq!(doc.str_field("alt"), Some("Logo"));
        assert!(!doc.fields.contains_key("id"));
        assert_eq!(doc.to_value(), json!({"id": "64f0", "alt": "Logo"}));

        assert!(Document::from_value(json!({"alt": "no id"})).is_err());
        assert!(Document::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_filter_matches() {
        let mut fields = Map::new();
        fields.insert("alt".to_string(), json!("Logo"));
        let id = DocumentId::Number(1);

        assert!(Filter::All.matches(&id, &fields));
        assert!(Filter::equals("alt", "Logo").matches(&id, &fields));
        assert!(!Filter::equals("alt", "Other").matches(&id, &fields));
        assert!(Filter::equals("id", 1).matches(&id, &fields));
    }

    #[test]
    fn test_collection_slug_round_trip() {
        for collection in [
            Collection::Users,
            Collection::Media,
            Collection::SkillCategories,
            Collection::Skills,
            Collection::SoftwareProjects,
        ] {
            assert_eq!(Collection::from_slug(collection.slug()), Some(collection));
        }
        assert_eq!(Collection::from_slug("pages"), None);
    }
}
