// Field mappings from export records onto destination documents
use migrate_shared::Entity;
use serde_json::{Map, Value};

pub const CATEGORY_FIELDS: &[&str] = &["name", "order"];

pub const SKILL_FIELDS: &[&str] = &["name", "level", "iconClassName", "url"];

pub const PROJECT_FIELDS: &[&str] = &[
    "title",
    "slug",
    "description",
    "longDescription",
    "projectType",
    "developedAt",
    "liveUrl",
    "repoUrl",
    "tags",
];

// Relationship fields
pub const SKILL_CATEGORY: &str = "skill_category";
pub const SVG_ICON: &str = "svgIcon";
pub const COVER_IMAGE: &str = "coverImage";
pub const GALLERY: &str = "gallery";
pub const CATEGORY_SKILLS: &str = "skills";

/// Copy the listed fields that `entity` carries, nulls included.
pub fn copy_fields(entity: &Entity, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|&name| {
            entity
                .data
                .get(name)
                .map(|value| (name.to_string(), value.clone()))
        })
        .collect()
}

/// Alt text of an upload: its alternative text, or its name when that is empty.
pub fn media_alt(entity: &Entity) -> Option<String> {
    entity
        .str_field("alternativeText")
        .filter(|s| !s.is_empty())
        .or_else(|| entity.str_field("name").filter(|s| !s.is_empty()))
        .map(str::to_string)
}
