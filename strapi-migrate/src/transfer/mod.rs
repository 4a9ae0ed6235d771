//! Tools working on the destination alone: collection export and import,
//! and repair of the category → skills back-references.

pub mod export;
pub mod import;
pub mod repair;

pub use export::{export_collections, write_export, ExportData, EXPORT_COLLECTIONS};
pub use import::{
    import_collections, read_export, CollectionSummary, ImportOptions, ImportSummary, IMPORT_ORDER,
};
pub use repair::fix_skill_relations;
