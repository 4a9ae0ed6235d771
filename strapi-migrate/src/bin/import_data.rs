// Import - replay an export into Payload, remapping relationship ids
use std::env;
use std::path::PathBuf;

use content_store::{PayloadConfig, PayloadProvider};
use strapi_migrate::logging::init_tracing;
use strapi_migrate::transfer::{import_collections, read_export, ImportOptions};
use tracing::{error, info, warn};

const DEFAULT_INPUT: &str = "migration-data.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing("import-data", module_path!());

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        error!("Usage: {} [input_file]", args[0]);
        error!("Example: {} {}", args[0], DEFAULT_INPUT);
        std::process::exit(1);
    }
    let input = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(DEFAULT_INPUT));

    let data = read_export(&input).await?;
    let options = ImportOptions::from_env();
    if options.user_password.is_none() {
        warn!("IMPORT_USER_PASSWORD not set, users without a password will be skipped");
    }

    let provider = PayloadProvider::new(&PayloadConfig::from_env()).await?;
    let summary = import_collections(&provider, &data, &options).await;

    for (collection, counts) in &summary.collections {
        info!(
            "{}: imported={} skipped={} failed={}",
            collection, counts.imported, counts.skipped, counts.failed
        );
    }
    info!("Import finished!");
    Ok(())
}
