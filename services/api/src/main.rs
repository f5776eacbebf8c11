use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::{
    database::{self, DatabaseConfig},
    settings::HttpSettings,
};
use matching::{MatchingConfig, MatchingEngine};
use tokio::net::TcpListener;

use crate::{middleware::TokenVerifier, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let matching_config = MatchingConfig::load()?;
    info!(
        "Matching within {} km of each request",
        matching_config.radius_km
    );

    let engine = MatchingEngine::new(pool.clone(), matching_config);
    let token_verifier = TokenVerifier::from_env()?;
    let http = HttpSettings::load()?;

    let app = routes::create_router(AppState::new(pool, engine, token_verifier));

    let listener = TcpListener::bind(http.api_addr).await?;
    info!("API service listening on {}", http.api_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
