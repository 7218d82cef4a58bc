// Main entry point - Configuration, dependency wiring and the migration run
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::account_rewriter::AccountMapping;
use crate::application::migration_service::DashboardMigrationService;
use crate::infrastructure::config::load_migration_config;
use crate::infrastructure::name_list::{input_base_name, load_names};
use crate::infrastructure::nerdgraph_client::NerdGraphClient;
use crate::presentation::status_report::{status_file_name, write_status_csv};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dashboard_migrator=info")),
        )
        .init();

    // Load configuration; missing credentials abort before any dashboard is touched
    let config = load_migration_config()?;
    tracing::info!("Using fromFile : {}", config.from_file);
    tracing::info!("Using sourceAccount : {}", config.source.account_id);
    tracing::info!("Using sourceApiKey : {}", config.source.masked_api_key());
    tracing::info!("sourceRegion : {}", config.source.region.as_str());
    tracing::info!("Using targetAccount : {}", config.target.account_id);
    tracing::info!("Using targetApiKey : {}", config.target.masked_api_key());
    tracing::info!("targetRegion : {}", config.target.region.as_str());

    let names = load_names(&config.from_file)?;

    // Create directory clients (infrastructure layer)
    let source = Arc::new(NerdGraphClient::for_account(&config.source));
    let target = Arc::new(NerdGraphClient::for_account(&config.target));

    // Run the migration (application layer)
    let service = DashboardMigrationService::new(
        source,
        target,
        AccountMapping::new(config.source.account_id, config.target.account_id),
        config.account_ids_policy,
    );
    let ledger = service.migrate(&names).await;
    if ledger.is_empty() {
        tracing::warn!("No dashboard names found in {}", config.from_file);
    }

    // Report (presentation layer)
    let file_name = status_file_name(
        config.source.account_id,
        &input_base_name(&config.from_file),
        config.target.account_id,
    );
    let report = write_status_csv(Path::new(&config.report_dir).join(file_name), &ledger)?;
    tracing::info!(report = %report.display(), "Migration finished: {}", ledger.summary());

    Ok(())
}
