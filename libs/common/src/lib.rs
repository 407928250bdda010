//! Common library for the recipe application
//!
//! This crate provides functionality shared by the auth and recipe services:
//! database connectivity and migrations, bearer tokens, listener settings
//! and the storage error type.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, WaitConfig, run_migrations, wait_for_db};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = wait_for_db(&config, &WaitConfig::default()).await;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod settings;
pub mod token;
