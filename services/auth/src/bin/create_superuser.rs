use anyhow::Result;
use auth::{
    models::NewUser,
    password::hash_password,
    repositories::UserRepository,
    validation::{validate_email, validate_password},
};
use clap::Parser;
use common::database::{self, DatabaseConfig, WaitConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "create-superuser")]
#[command(about = "Create an active staff superuser")]
struct Cli {
    /// Email address, used to log in
    email: String,

    /// Password, at least 5 characters
    password: String,

    /// Display name
    #[arg(long, default_value = "")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let email = validate_email(&cli.email)?;
    validate_password(&cli.password)?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::wait_for_db(&db_config, &WaitConfig::default()).await;
    database::run_migrations(&pool).await?;

    let user = UserRepository::new(pool)
        .create_superuser(&NewUser {
            email,
            name: cli.name.trim().to_string(),
            password_hash: hash_password(&cli.password)?,
        })
        .await?;

    info!("Superuser {} created", user.email);

    Ok(())
}
