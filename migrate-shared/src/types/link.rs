//! Link records of the Strapi export.
//!
//! A link connects two entities (or an entity and an uploaded file). The
//! `kind` decides which directions get recorded:
//!
//! - `relation.basic`: `left.field` points at `right`; `right.field`, when
//!   present, points back.
//! - `relation.morph`: polymorphic attachment, only `right.field` points at `left`.
//! - `relation.circular`: translations of one another when the field is
//!   `localizations`; `right.ref` is a documentId, not a numeric id.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::EntityKey;

const BASIC: &str = "relation.basic";
const MORPH: &str = "relation.morph";
const CIRCULAR: &str = "relation.circular";

/// Field name carried by circular links between translations.
pub const LOCALIZATIONS_FIELD: &str = "localizations";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Basic,
    Morph,
    Circular,
    /// Anything else; ignored by the link loader.
    Unknown(String),
}

impl LinkKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            BASIC => Self::Basic,
            MORPH => Self::Morph,
            CIRCULAR => Self::Circular,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => BASIC,
            Self::Morph => MORPH,
            Self::Circular => CIRCULAR,
            Self::Unknown(kind) => kind,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference on one side of a link: a numeric entity id or a documentId.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkRef {
    Id(i64),
    Document(String),
}

impl LinkRef {
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Document(_) => None,
        }
    }

    /// The reference as a documentId string. Numeric refs are rendered so a
    /// documentId that happens to look numeric still matches.
    pub fn as_document_id(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Document(doc) => doc.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEnd {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "ref")]
    pub reference: LinkRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl LinkEnd {
    /// Entity key of this side, when it names a type and a numeric id.
    pub fn entity_key(&self) -> Option<EntityKey> {
        let type_name = self.type_name.as_deref()?;
        let id = self.reference.as_id()?;
        Some(EntityKey::from_type(type_name, id))
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref().filter(|f| !f.is_empty())
    }
}

/// A single exported link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLink", into = "RawLink")]
pub struct Link {
    pub kind: LinkKind,
    pub left: LinkEnd,
    pub right: LinkEnd,
}

#[derive(Serialize, Deserialize)]
struct RawLink {
    kind: String,
    left: LinkEnd,
    right: LinkEnd,
}

impl From<RawLink> for Link {
    fn from(raw: RawLink) -> Self {
        Self {
            kind: LinkKind::parse(&raw.kind),
            left: raw.left,
            right: raw.right,
        }
    }
}

impl From<Link> for RawLink {
    fn from(link: Link) -> Self {
        Self {
            kind: link.kind.as_str().to_string(),
            left: link.left,
            right: link.right,
        }
    }
}

impl Link {
    /// True for circular links between translations of one document.
    pub fn is_localization(&self) -> bool {
        self.kind == LinkKind::Circular && self.left.field() == Some(LOCALIZATIONS_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityKind;

    #[test]
    fn test_basic_link() {
        let line = r#"{"kind":"relation.basic","relation":"manyToOne","left":{"type":"api::skill.skill","ref":3,"field":"skill_category"},"right":{"type":"api::skill-category.skill-category","ref":1,"field":"skills"}}"#;
        let link: Link = serde_json::from_str(line).unwrap();

        assert_eq!(link.kind, LinkKind::Basic);
        assert_eq!(
            link.left.entity_key(),
            Some(EntityKey::new(EntityKind::Skill, 3))
        );
        assert_eq!(link.right.field(), Some("skills"));
    }

    #[test]
    fn test_circular_link_with_document_ref() {
        let line = r#"{"kind":"relation.circular","left":{"type":"api::skill-category.skill-category","ref":2,"field":"localizations"},"right":{"ref":"doc1"}}"#;
        let link: Link = serde_json::from_str(line).unwrap();

        assert!(link.is_localization());
        assert_eq!(link.right.reference, LinkRef::Document("doc1".to_string()));
        assert_eq!(link.right.entity_key(), None);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let line = r#"{"kind":"relation.weird","left":{"type":"a","ref":1},"right":{"type":"b","ref":2}}"#;
        let link: Link = serde_json::from_str(line).unwrap();

        assert_eq!(link.kind, LinkKind::Unknown("relation.weird".to_string()));
        assert!(!link.is_localization());
    }
}
