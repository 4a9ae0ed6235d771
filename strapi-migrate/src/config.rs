// Configuration for the migration run and environment helpers
use std::env;
use std::path::{Path, PathBuf};

use crate::errors::MigrateError;

/// Default location of the Strapi export, relative to the working directory.
pub const DEFAULT_EXPORT_DIR: &str = "strapi/content";

/// Locale whose records are created; every other locale is applied onto them.
pub const DEFAULT_LOCALE: &str = "en";

/// File name prefixes of the export shards.
pub const ENTITIES_PREFIX: &str = "entities_";
pub const LINKS_PREFIX: &str = "links_";
pub const JSONL_EXTENSION: &str = "jsonl";

// Progress reporting interval for per-record phases
pub const PROGRESS_REPORT_INTERVAL: usize = 25;

/// Settings for one migration run.
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Root of the Strapi export (`entities/`, `links/`, `assets/uploads/`).
    pub export_dir: PathBuf,
    /// Explicit entities file; otherwise every `entities/entities_*.jsonl`.
    pub entities_file: Option<PathBuf>,
    /// Explicit links file; otherwise every `links/links_*.jsonl`.
    pub links_file: Option<PathBuf>,
    /// Directory holding uploaded files named `<hash><ext>`.
    pub assets_dir: PathBuf,
    pub default_locale: String,
    /// Clear projects, skills and categories before writing.
    pub wipe: bool,
}

impl MigrateConfig {
    /// Create a config rooted at `export_dir` with the standard layout.
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        let export_dir = export_dir.into();
        let assets_dir = export_dir.join("assets").join("uploads");
        Self {
            export_dir,
            entities_file: None,
            links_file: None,
            assets_dir,
            default_locale: DEFAULT_LOCALE.to_string(),
            wipe: true,
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STRAPI_EXPORT_DIR`: export root (default: strapi/content)
    /// - `ENTITIES_FILE`: single entities file instead of discovery
    /// - `LINKS_FILE`: single links file instead of discovery
    /// - `ASSETS_DIR`: uploaded files (default: `<export>/assets/uploads`)
    /// - `DEFAULT_LOCALE`: canonical locale (default: en)
    /// - `WIPE_COLLECTIONS`: clear destination collections first (default: true)
    pub fn from_env() -> Result<Self, MigrateError> {
        let export_dir =
            env::var("STRAPI_EXPORT_DIR").unwrap_or_else(|_| DEFAULT_EXPORT_DIR.to_string());
        let mut config = Self::new(export_dir);

        if let Some(path) = non_empty_var("ENTITIES_FILE") {
            config.entities_file = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty_var("LINKS_FILE") {
            config.links_file = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty_var("ASSETS_DIR") {
            config.assets_dir = PathBuf::from(path);
        }
        if let Some(locale) = non_empty_var("DEFAULT_LOCALE") {
            config.default_locale = locale;
        }
        if let Some(wipe) = non_empty_var("WIPE_COLLECTIONS") {
            config.wipe = wipe_flag(&wipe)?;
        }

        Ok(config)
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn with_wipe(mut self, wipe: bool) -> Self {
        self.wipe = wipe;
        self
    }

    pub fn entities_dir(&self) -> PathBuf {
        self.export_dir.join("entities")
    }

    pub fn links_dir(&self) -> PathBuf {
        self.export_dir.join("links")
    }

    /// Path of the backing file for an upload named by hash and extension.
    pub fn asset_path(&self, hash: &str, ext: &str) -> PathBuf {
        asset_path(&self.assets_dir, hash, ext)
    }
}

pub fn asset_path(assets_dir: &Path, hash: &str, ext: &str) -> PathBuf {
    assets_dir.join(format!("{}{}", hash, ext))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn wipe_flag(value: &str) -> Result<bool, MigrateError> {
    parse_flag(value).ok_or_else(|| {
        MigrateError::config(format!("WIPE_COLLECTIONS must be a boolean flag, got {:?}", value))
    })
}

/// Parse a boolean environment flag ("true"/"false", "1"/"0", "yes"/"no").
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
