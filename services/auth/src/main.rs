use anyhow::Result;
use auth::{AppState, routes};
use common::{
    database::{self, DatabaseConfig, WaitConfig},
    settings::ServerConfig,
    token::{JwtConfig, JwtService},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting authentication service");

    // Wait for the database, then bring the schema up to date
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::wait_for_db(&db_config, &WaitConfig::default()).await;
    database::run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let server_config = ServerConfig::from_env("AUTH", 3000)?;

    info!("Authentication service initialized successfully");

    let app = routes::create_router(AppState::new(pool, jwt_service));

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
