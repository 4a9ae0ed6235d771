// Export - dump the destination collections into one JSON file
use std::env;
use std::path::PathBuf;

use content_store::{PayloadConfig, PayloadProvider};
use strapi_migrate::logging::init_tracing;
use strapi_migrate::transfer::{export_collections, write_export};
use tracing::{error, info};

const DEFAULT_OUTPUT: &str = "migration-data.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing("export-data", module_path!());

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        error!("Usage: {} [output_file]", args[0]);
        error!("Example: {} {}", args[0], DEFAULT_OUTPUT);
        std::process::exit(1);
    }
    let output = PathBuf::from(args.get(1).map(String::as_str).unwrap_or(DEFAULT_OUTPUT));

    let provider = PayloadProvider::new(&PayloadConfig::from_env()).await?;
    let data = export_collections(&provider).await?;
    write_export(&output, &data).await?;

    info!("Export successful! Data saved to {}", output.display());
    Ok(())
}
