//! Application state shared across handlers

use common::token::JwtService;
use sqlx::PgPool;

use crate::{
    models::NamedEntity,
    repositories::{NamedRepository, RecipeRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub recipe_repository: RecipeRepository,
}

impl AppState {
    /// Create the state for a pool and token service
    pub fn new(db_pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            recipe_repository: RecipeRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
        }
    }

    /// Repository for tags or ingredients
    pub fn named<E: NamedEntity>(&self) -> NamedRepository<E> {
        NamedRepository::new(self.db_pool.clone())
    }
}
