use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scheduler;

use common::database::{self, DatabaseConfig};
use matching::{MatchingConfig, MatchingEngine};
use scheduler::DiscoveryScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting match discovery worker");

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let config = MatchingConfig::load()?;
    let schedule = config.discovery_schedule.clone();
    let discovery = DiscoveryScheduler::new(MatchingEngine::new(pool, config));

    // Catch up before the first scheduled tick
    discovery.run_once().await;

    let mut scheduler = discovery.start(&schedule).await?;

    // Keep the worker running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down match discovery worker");
    scheduler.shutdown().await?;

    Ok(())
}
