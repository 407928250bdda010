//! Repositories for database operations

pub mod named;
pub mod recipe;

pub use named::NamedRepository;
pub use recipe::RecipeRepository;
