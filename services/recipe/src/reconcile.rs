//! Reconciliation of nested tag/ingredient descriptors with recipe links
//!
//! Descriptors are validated up front by [`collect_names`], so a request with
//! one bad descriptor never reaches the database. The async functions run on
//! the caller's transaction connection.

use std::collections::HashSet;

use common::error::DatabaseResult;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::FieldError,
    models::named::{NamedDescriptor, NamedEntity, validate_name},
    repositories::named,
};

/// Validate descriptors and return their names, first occurrence order, without repeats
pub fn collect_names(field: &str, descriptors: &[NamedDescriptor]) -> Result<Vec<String>, FieldError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(descriptors.len());

    for (index, descriptor) in descriptors.iter().enumerate() {
        let name = validate_name(&format!("{field}[{index}].name"), &descriptor.name)?;
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    Ok(names)
}

/// Get or create each named entity for `user_id` and link it to the recipe
///
/// Linking an entity that is already attached changes nothing.
pub async fn attach<E: NamedEntity>(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: i64,
    names: &[String],
) -> DatabaseResult<Vec<E>> {
    let mut attached = Vec::with_capacity(names.len());

    for name in names {
        let entity = named::get_or_create::<E>(&mut *conn, user_id, name).await?;
        named::link::<E>(&mut *conn, recipe_id, entity.id()).await?;
        attached.push(entity);
    }

    Ok(attached)
}

/// Drop every existing link of this kind, then attach `names`
pub async fn replace<E: NamedEntity>(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: i64,
    names: &[String],
) -> DatabaseResult<Vec<E>> {
    let removed = named::unlink_all::<E>(&mut *conn, recipe_id).await?;
    info!(
        "Replacing {} {}s of recipe {} with {}",
        removed,
        E::LABEL,
        recipe_id,
        names.len()
    );

    attach::<E>(conn, user_id, recipe_id, names).await
}
