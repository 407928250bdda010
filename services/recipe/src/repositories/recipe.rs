//! Recipe repository for database operations

use common::error::DatabaseResult;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::{
    filters::RecipeFilter,
    models::{
        field::Field,
        named::{Ingredient, Tag},
        recipe::{NewRecipe, RecipeChanges, RecipeDetail, RecipeRow, RecipeSummary},
    },
    reconcile,
    repositories::named,
};

const RECIPE_COLUMNS: &str = "r.id, r.user_id, r.title, r.time_minutes, r.price, r.link, \
                              r.description, r.image, r.created_at, r.updated_at";

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the user's recipes matching `filter`, newest first
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &RecipeFilter,
    ) -> DatabaseResult<Vec<RecipeSummary>> {
        let mut conn = self.pool.acquire().await?;

        let mut builder = list_query(user_id, filter);
        let rows: Vec<RecipeRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

        let details = with_relations(&mut conn, rows).await?;
        Ok(details.into_iter().map(RecipeSummary::from).collect())
    }

    /// Find one of the user's recipes by ID
    pub async fn find(&self, user_id: Uuid, id: i64) -> DatabaseResult<Option<RecipeDetail>> {
        let mut conn = self.pool.acquire().await?;
        fetch_detail(&mut conn, user_id, id).await
    }

    /// Create a recipe and reconcile its tags and ingredients in one transaction
    pub async fn create(&self, user_id: Uuid, recipe: &NewRecipe) -> DatabaseResult<RecipeDetail> {
        info!("Creating recipe for user: {}", user_id);

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&recipe.title)
        .bind(recipe.time_minutes)
        .bind(recipe.price)
        .bind(&recipe.link)
        .bind(&recipe.description)
        .bind(&recipe.image)
        .fetch_one(&mut *tx)
        .await?;

        reconcile::attach::<Tag>(&mut tx, user_id, id, &recipe.tags).await?;
        reconcile::attach::<Ingredient>(&mut tx, user_id, id, &recipe.ingredients).await?;

        let detail = fetch_detail(&mut tx, user_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        info!("Created recipe {} for user {}", id, user_id);
        Ok(detail)
    }

    /// Apply changes to one of the user's recipes
    ///
    /// Present `tags`/`ingredients` replace the current links; missing ones
    /// leave them alone. Returns `Ok(None)` if the recipe is not the user's.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: i64,
        changes: &RecipeChanges,
    ) -> DatabaseResult<Option<RecipeDetail>> {
        info!("Updating recipe {} for user {}", id, user_id);

        let mut tx = self.pool.begin().await?;

        let owned: Option<i64> =
            sqlx::query_scalar("SELECT id FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        if owned.is_none() {
            return Ok(None);
        }

        if changes.touches_row() || changes.tags.is_present() || changes.ingredients.is_present() {
            update_query(user_id, id, changes)
                .build()
                .execute(&mut *tx)
                .await?;
        }

        if let Field::Present(names) = &changes.tags {
            reconcile::replace::<Tag>(&mut tx, user_id, id, names).await?;
        }

        if let Field::Present(names) = &changes.ingredients {
            reconcile::replace::<Ingredient>(&mut tx, user_id, id, names).await?;
        }

        let detail = fetch_detail(&mut tx, user_id, id).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Delete one of the user's recipes; tags and ingredients are kept
    pub async fn delete(&self, user_id: Uuid, id: i64) -> DatabaseResult<bool> {
        info!("Deleting recipe {} for user {}", id, user_id);

        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn list_query(user_id: Uuid, filter: &RecipeFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.user_id = "
    ));
    builder.push_bind(user_id);
    filter.push_conditions(&mut builder);
    builder.push(" ORDER BY r.id DESC");
    builder
}

fn update_query(user_id: Uuid, id: i64, changes: &RecipeChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE recipes SET updated_at = NOW()");

    if let Field::Present(title) = &changes.title {
        builder.push(", title = ").push_bind(title.clone());
    }
    if let Field::Present(time_minutes) = &changes.time_minutes {
        builder.push(", time_minutes = ").push_bind(*time_minutes);
    }
    if let Field::Present(price) = &changes.price {
        builder.push(", price = ").push_bind(*price);
    }
    if let Field::Present(link) = &changes.link {
        builder.push(", link = ").push_bind(link.clone());
    }
    if let Field::Present(description) = &changes.description {
        builder.push(", description = ").push_bind(description.clone());
    }
    if let Field::Present(image) = &changes.image {
        builder.push(", image = ").push_bind(image.clone());
    }

    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(user_id);
    builder
}

async fn fetch_detail(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: i64,
) -> DatabaseResult<Option<RecipeDetail>> {
    let row: Option<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(with_relations(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn with_relations(
    conn: &mut PgConnection,
    rows: Vec<RecipeRow>,
) -> DatabaseResult<Vec<RecipeDetail>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut tags = named::linked::<Tag>(&mut *conn, &ids).await?;
    let mut ingredients = named::linked::<Ingredient>(&mut *conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let tags = tags.remove(&row.id).unwrap_or_default();
            let ingredients = ingredients.remove(&row.id).unwrap_or_default();
            RecipeDetail::from_row(row, tags, ingredients)
        })
        .collect())
}
