// Migration executor - orchestrates the migration flow
use std::sync::Arc;
use std::time::Instant;

use content_store::ContentStore;
use tracing::{info, warn};

use super::localization::localize_all;
use super::media::migrate_media;
use super::projects::migrate_projects;
use super::report::MigrationReport;
use super::run::MigrationRun;
use super::skills::{
    backfill_category_skills, group_skills_by_category, migrate_skill_categories, migrate_skills,
};
use super::wipe::wipe_collections;
use crate::config::MigrateConfig;
use crate::errors::MigrateError;
use crate::loader::load_export;

/// Migration executor that coordinates the migration process
pub struct MigrationExecutor {
    store: Arc<dyn ContentStore>,
    config: MigrateConfig,
}

impl MigrationExecutor {
    /// Create a new migration executor
    pub fn new(store: Arc<dyn ContentStore>, config: MigrateConfig) -> Self {
        Self { store, config }
    }

    /// Execute the full migration process.
    ///
    /// Only a missing or unreadable entity export aborts the run. Failures of
    /// single records are logged and end up in the returned report.
    pub async fn execute(&self) -> Result<MigrationReport, MigrateError> {
        let start_time = Instant::now();

        // Step 1: Read the export
        info!("=== Reading Strapi export ===");
        let export = load_export(&self.config).await?;
        info!("✓ Read {} entities", export.entities.len());
        info!("✓ Indexed {} relations", export.relations.len());
        if export.summary.malformed_lines() > 0 {
            warn!(
                "Skipped {} malformed lines",
                export.summary.malformed_lines()
            );
        }

        let mut run = MigrationRun::new(export, self.config.default_locale.clone());

        // Step 2: Write to the content store
        self.run_phases(&mut run).await;

        // Step 3: Report statistics
        let mut report = run.report;
        report.finish(&run.entities, start_time.elapsed());
        report.log_summary();

        Ok(report)
    }

    /// Apply every write phase to `run`, in dependency order.
    pub async fn run_phases(&self, run: &mut MigrationRun) {
        let store = self.store.as_ref();

        if self.config.wipe {
            info!("=== Cleaning up existing data ===");
            wipe_collections(store, &mut run.report).await;
        }

        info!("=== Migrating Media ===");
        migrate_media(store, run, &self.config.assets_dir).await;

        info!("=== Migrating Skill Categories ({}) ===", run.default_locale);
        migrate_skill_categories(store, run).await;

        info!("=== Migrating Skills ({}) ===", run.default_locale);
        let skills = migrate_skills(store, run).await;

        info!("=== Updating Skill Categories with Skills ===");
        let groups = group_skills_by_category(skills);
        run.report.backfill = backfill_category_skills(store, &groups).await;

        info!("=== Migrating Projects ({}) ===", run.default_locale);
        migrate_projects(store, run).await;

        info!("=== Migrating Localizations ===");
        localize_all(store, run).await;
    }
}
