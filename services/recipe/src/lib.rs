//! Recipe service: recipes with per-user tags and ingredients

pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod routes;
pub mod state;

pub use state::AppState;
