//! Repository for tags and ingredients
//!
//! Both entities share one table layout, so every query here is written once
//! against the [`NamedEntity`] constants.

use std::collections::HashMap;
use std::marker::PhantomData;

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::named::NamedEntity;

#[derive(Debug, FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

impl NamedRow {
    fn into_entity<E: NamedEntity>(self) -> E {
        E::from_parts(self.id, self.name)
    }
}

#[derive(Debug, FromRow)]
struct LinkedRow {
    recipe_id: i64,
    id: i64,
    name: String,
}

/// Attempts at the insert-then-select pair before giving up
const GET_OR_CREATE_ATTEMPTS: usize = 2;

/// Return the user's entity with this exact name, creating it if absent
///
/// Relies on `UNIQUE (user_id, name)`: a concurrent insert of the same name
/// makes ours a no-op and the follow-up select returns the winner's row. If
/// that row is renamed or deleted before the select, the insert is retried.
pub async fn get_or_create<E: NamedEntity>(
    conn: &mut PgConnection,
    user_id: Uuid,
    name: &str,
) -> DatabaseResult<E> {
    for _ in 0..GET_OR_CREATE_ATTEMPTS {
        let inserted: Option<NamedRow> = sqlx::query_as(&format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) \
             ON CONFLICT (user_id, name) DO NOTHING \
             RETURNING id, name",
            E::TABLE
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = inserted {
            let entity: E = row.into_entity();
            info!("Created {} '{}' for user {}", E::LABEL, entity.name(), user_id);
            return Ok(entity);
        }

        let existing: Option<NamedRow> = sqlx::query_as(&format!(
            "SELECT id, name FROM {} WHERE user_id = $1 AND name = $2",
            E::TABLE
        ))
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = existing {
            return Ok(row.into_entity());
        }

        warn!("{} '{}' of user {} vanished after a conflict, retrying", E::LABEL, name, user_id);
    }

    Err(DatabaseError::from(sqlx::Error::RowNotFound))
}

/// Link an entity to a recipe; returns false if the link already existed
pub async fn link<E: NamedEntity>(
    conn: &mut PgConnection,
    recipe_id: i64,
    entity_id: i64,
) -> DatabaseResult<bool> {
    let result = sqlx::query(&format!(
        "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        E::LINK_TABLE,
        E::LINK_COLUMN
    ))
    .bind(recipe_id)
    .bind(entity_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove every link of this kind from a recipe; the entities themselves stay
pub async fn unlink_all<E: NamedEntity>(
    conn: &mut PgConnection,
    recipe_id: i64,
) -> DatabaseResult<u64> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        E::LINK_TABLE
    ))
    .bind(recipe_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Load the linked entities of several recipes at once, keyed by recipe id
pub async fn linked<E: NamedEntity>(
    conn: &mut PgConnection,
    recipe_ids: &[i64],
) -> DatabaseResult<HashMap<i64, Vec<E>>> {
    let mut linked: HashMap<i64, Vec<E>> = HashMap::new();

    if recipe_ids.is_empty() {
        return Ok(linked);
    }

    let rows: Vec<LinkedRow> = sqlx::query_as(&format!(
        "SELECT l.recipe_id, e.id, e.name FROM {link} l \
         JOIN {table} e ON e.id = l.{column} \
         WHERE l.recipe_id = ANY($1) \
         ORDER BY e.id",
        link = E::LINK_TABLE,
        table = E::TABLE,
        column = E::LINK_COLUMN
    ))
    .bind(recipe_ids)
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        linked
            .entry(row.recipe_id)
            .or_default()
            .push(E::from_parts(row.id, row.name));
    }

    Ok(linked)
}

/// SQL listing a user's entities, optionally only those linked to a recipe
///
/// Only links from recipes of the same owner count as assignments; since the
/// reconciler never links across users this matches "any recipe".
pub fn list_sql<E: NamedEntity>(assigned_only: bool) -> String {
    let mut sql = format!("SELECT e.id, e.name FROM {} e WHERE e.user_id = $1", E::TABLE);

    if assigned_only {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM {link} l JOIN recipes r ON r.id = l.recipe_id \
             WHERE l.{column} = e.id AND r.user_id = e.user_id)",
            link = E::LINK_TABLE,
            column = E::LINK_COLUMN
        ));
    }

    sql.push_str(" ORDER BY e.name DESC, e.id DESC");
    sql
}

/// Tag or ingredient repository for the list/update/delete endpoints
pub struct NamedRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for NamedRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: NamedEntity> NamedRepository<E> {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// List the user's entities by name, descending
    pub async fn list(&self, user_id: Uuid, assigned_only: bool) -> DatabaseResult<Vec<E>> {
        let rows: Vec<NamedRow> = sqlx::query_as(&list_sql::<E>(assigned_only))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(NamedRow::into_entity).collect())
    }

    /// Rename an entity owned by the user; `None` leaves the name unchanged
    ///
    /// Returns `Ok(None)` when the entity does not exist for this user.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: i64,
        name: Option<&str>,
    ) -> DatabaseResult<Option<E>> {
        info!("Updating {} {} for user {}", E::LABEL, id, user_id);

        let row: Option<NamedRow> = match name {
            Some(name) => sqlx::query_as(&format!(
                "UPDATE {} SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING id, name",
                E::TABLE
            ))
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::from(e)
                    .with_conflict_message(format!("{} with this name already exists", E::LABEL))
            })?,
            None => sqlx::query_as(&format!(
                "SELECT id, name FROM {} WHERE id = $1 AND user_id = $2",
                E::TABLE
            ))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?,
        };

        Ok(row.map(NamedRow::into_entity))
    }

    /// Delete an entity owned by the user; its recipe links go with it
    pub async fn delete(&self, user_id: Uuid, id: i64) -> DatabaseResult<bool> {
        info!("Deleting {} {} for user {}", E::LABEL, id, user_id);

        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            E::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
