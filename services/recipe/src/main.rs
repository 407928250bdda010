use anyhow::Result;
use common::{
    database::{self, DatabaseConfig, WaitConfig},
    settings::ServerConfig,
    token::{JwtConfig, JwtService},
};
use recipe::{AppState, routes};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting recipe service");

    // Wait for the database, then bring the schema up to date
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::wait_for_db(&db_config, &WaitConfig::default()).await;
    database::run_migrations(&pool).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let server_config = ServerConfig::from_env("RECIPE", 3001)?;

    info!("Recipe service initialized successfully");

    let app = routes::create_router(AppState::new(pool, jwt_service));

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Recipe service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
