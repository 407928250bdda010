//! API models for request and response payloads

pub mod field;
pub mod named;
pub mod recipe;

pub use field::Field;
pub use named::{Ingredient, NamedDescriptor, NamedEntity, Tag};
pub use recipe::{NewRecipe, RecipeChanges, RecipeDetail, RecipePayload, RecipeSummary};
