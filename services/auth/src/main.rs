use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod jwt;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod validation;

use common::{
    database::{self, DatabaseConfig},
    settings::HttpSettings,
};
use tokio::net::TcpListener;

use crate::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{LoginThrottle, ThrottleConfig},
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
    pub login_throttle: LoginThrottle,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting authentication service");

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

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let http = HttpSettings::load()?;

    let app_state = AppState {
        user_repository: UserRepository::new(pool),
        jwt_service,
        login_throttle: LoginThrottle::new(ThrottleConfig::default()),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(http.auth_addr).await?;
    info!("Authentication service listening on {}", http.auth_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
