use std::sync::Arc;

use anyhow::Result;
use content_store::{ContentStore, MockContentStore, PayloadConfig, PayloadProvider};
use strapi_migrate::config::parse_flag;
use strapi_migrate::logging::init_tracing;
use strapi_migrate::{MigrateConfig, MigrationExecutor};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    init_tracing("strapi-migrate", module_path!());

    let config = MigrateConfig::from_env()?;
    info!(
        export_dir = %config.export_dir.display(),
        default_locale = %config.default_locale,
        wipe = config.wipe,
        "Starting Strapi to Payload migration"
    );

    let dry_run = std::env::var("MIGRATE_DRY_RUN")
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(false);

    let store: Arc<dyn ContentStore> = if dry_run {
        warn!("Dry run: writing to an in-memory store");
        Arc::new(MockContentStore::new(config.default_locale.clone()))
    } else {
        let payload_config = PayloadConfig::from_env();
        info!("Connecting to Payload at {}...", payload_config.url);
        let provider = PayloadProvider::new(&payload_config).await?;
        info!("✓ Connected to Payload");
        Arc::new(provider)
    };

    // Create and execute migration
    let executor = MigrationExecutor::new(store, config);
    match executor.execute().await {
        Ok(report) => {
            if report.has_failures() {
                warn!("Migration finished with failures");
            } else {
                info!("Migration completed!");
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            Err(e.into())
        }
    }
}
