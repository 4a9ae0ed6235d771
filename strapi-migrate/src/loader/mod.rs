//! Readers for the Strapi export.
//!
//! Both stages are loaded completely before the first write to the
//! destination: entities first, since translation links are resolved through
//! the documentId index they produce.

pub mod entities;
pub mod jsonl;
pub mod links;

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::BufReader;
use tracing::{info, instrument, warn};

use crate::config::{MigrateConfig, ENTITIES_PREFIX, JSONL_EXTENSION, LINKS_PREFIX};
use crate::errors::MigrateError;
use crate::relations::RelationIndex;

pub use entities::{load_entities, EntityStore};
pub use jsonl::{parse_line, read_records, LineStats};
pub use links::{apply_link, load_links, LinkStats};

/// Counters of one export load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub entity_files: Vec<PathBuf>,
    pub link_files: Vec<PathBuf>,
    pub entity_lines: LineStats,
    pub link_lines: LineStats,
    pub links: LinkStats,
}

impl LoadSummary {
    pub fn malformed_lines(&self) -> usize {
        self.entity_lines.malformed + self.link_lines.malformed
    }
}

/// Entities and relationships of a loaded export.
#[derive(Debug, Default)]
pub struct LoadedExport {
    pub entities: EntityStore,
    pub relations: RelationIndex,
    pub summary: LoadSummary,
}

/// Every `<prefix>*.jsonl` file directly inside `dir`, sorted by name.
/// A missing directory yields no files.
pub async fn discover_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, MigrateError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(MigrateError::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MigrateError::io(dir, e))?
    {
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(prefix))
            .unwrap_or(false)
            && path.extension().and_then(|e| e.to_str()) == Some(JSONL_EXTENSION);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load entity files in order. At least one file is required and every
/// listed file must exist.
pub async fn read_entity_files(
    paths: &[PathBuf],
) -> Result<(EntityStore, LineStats), MigrateError> {
    if paths.is_empty() {
        return Err(MigrateError::MissingInput(PathBuf::from(format!(
            "{}*.{}",
            ENTITIES_PREFIX, JSONL_EXTENSION
        ))));
    }

    let mut store = EntityStore::new();
    let mut stats = LineStats::default();
    for path in paths {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MigrateError::MissingInput(path.clone()))
            }
            Err(e) => return Err(MigrateError::io(path, e)),
        };
        let source = path.display().to_string();
        let file_stats = load_entities(BufReader::new(file), &source, &mut store)
            .await
            .map_err(|e| MigrateError::io(path, e))?;
        info!(
            file = %source,
            parsed = file_stats.parsed,
            malformed = file_stats.malformed,
            "Read entity file"
        );
        stats.merge(file_stats);
    }
    Ok((store, stats))
}

/// Load link files in order. Missing files count as zero links.
pub async fn read_link_files(
    paths: &[PathBuf],
    entities: &EntityStore,
) -> Result<(RelationIndex, LineStats, LinkStats), MigrateError> {
    let mut index = RelationIndex::new();
    let mut line_stats = LineStats::default();
    let mut link_stats = LinkStats::default();

    for path in paths {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file = %path.display(), "Links file not found, continuing without it");
                continue;
            }
            Err(e) => return Err(MigrateError::io(path, e)),
        };
        let source = path.display().to_string();
        let (lines, links) = load_links(BufReader::new(file), &source, entities, &mut index)
            .await
            .map_err(|e| MigrateError::io(path, e))?;
        info!(
            file = %source,
            recorded = links.recorded,
            ignored = links.ignored,
            "Read link file"
        );
        line_stats.merge(lines);
        link_stats.merge(links);
    }
    Ok((index, line_stats, link_stats))
}

/// Load the whole export described by `config`.
#[instrument(skip(config), fields(export_dir = %config.export_dir.display()))]
pub async fn load_export(config: &MigrateConfig) -> Result<LoadedExport, MigrateError> {
    let entity_files = match &config.entities_file {
        Some(path) => vec![path.clone()],
        None => {
            let dir = config.entities_dir();
            let files = discover_files(&dir, ENTITIES_PREFIX).await?;
            if files.is_empty() {
                return Err(MigrateError::MissingInput(dir));
            }
            files
        }
    };
    let link_files = match &config.links_file {
        Some(path) => vec![path.clone()],
        None => discover_files(&config.links_dir(), LINKS_PREFIX).await?,
    };

    info!("Reading entities...");
    let (entities, entity_lines) = read_entity_files(&entity_files).await?;
    info!(
        entities = entities.len(),
        documents = entities.document_count(),
        "Loaded entities"
    );

    info!("Reading links...");
    let (relations, link_lines, links) = read_link_files(&link_files, &entities).await?;
    info!(edges = relations.len(), "Links processed");

    Ok(LoadedExport {
        entities,
        relations,
        summary: LoadSummary {
            entity_files,
            link_files,
            entity_lines,
            link_lines,
            links,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "entities_00002.jsonl",
            "entities_00001.jsonl",
            "links_00001.jsonl",
            "entities_notes.txt",
        ] {
            fs::write(dir.path().join(name), b"").await.unwrap();
        }

        let files = discover_files(dir.path(), ENTITIES_PREFIX).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["entities_00001.jsonl", "entities_00002.jsonl"]);

        let missing = discover_files(&dir.path().join("nope"), LINKS_PREFIX)
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_entities_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = MigrateConfig::new(dir.path());

        let err = load_export(&config).await.unwrap_err();
        assert!(matches!(err, MigrateError::MissingInput(_)));

        let err = read_entity_files(&[dir.path().join("entities_00001.jsonl")])
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_missing_links_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let entities_dir = dir.path().join("entities");
        fs::create_dir_all(&entities_dir).await.unwrap();
        fs::write(
            entities_dir.join("entities_00001.jsonl"),
            br#"{"type":"api::skill.skill","id":1,"data":{"name":"Rust","locale":"en"}}"#,
        )
        .await
        .unwrap();

        let mut config = MigrateConfig::new(dir.path());
        config.links_file = Some(dir.path().join("links").join("links_00001.jsonl"));

        let export = load_export(&config).await.unwrap();
        assert_eq!(export.entities.len(), 1);
        assert!(export.relations.is_empty());
        assert_eq!(export.summary.links, LinkStats::default());
    }
}
