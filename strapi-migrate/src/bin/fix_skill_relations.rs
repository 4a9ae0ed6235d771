// Fix relations - rebuild every category's skill list from the skills
use content_store::{PayloadConfig, PayloadProvider};
use strapi_migrate::logging::init_tracing;
use strapi_migrate::transfer::fix_skill_relations;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing("fix-skill-relations", module_path!());

    let provider = PayloadProvider::new(&PayloadConfig::from_env()).await?;
    let summary = fix_skill_relations(&provider).await?;

    info!(
        "Done! {} categories updated, {} failed",
        summary.updated, summary.failed
    );
    Ok(())
}
