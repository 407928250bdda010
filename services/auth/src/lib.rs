//! Authentication service: user registration, tokens and profile management

pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod validation;

use common::token::JwtService;
use sqlx::PgPool;

use crate::repositories::UserRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
}

impl AppState {
    /// Create the state for a pool and token service
    pub fn new(db_pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool),
            jwt_service,
        }
    }
}
