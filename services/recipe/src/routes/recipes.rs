//! Recipe endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    filters::RecipeFilter,
    middleware::AuthUser,
    models::{RecipeDetail, RecipePayload, RecipeSummary, recipe::RecipeListParams},
};

/// List the caller's recipes, optionally filtered by tag and ingredient ids
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<RecipeListParams>, ApiError>,
) -> ApiResult<Json<Vec<RecipeSummary>>> {
    let filter = RecipeFilter::from_params(&params)?;
    let recipes = state.recipe_repository.list(user.id, &filter).await?;

    Ok(Json(recipes))
}

/// Create a recipe, reconciling its nested tags and ingredients
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<RecipePayload>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let recipe = payload.into_new_recipe()?;
    let created = state.recipe_repository.create(user.id, &recipe).await?;

    info!("Recipe {} created", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get one of the caller's recipes
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = state
        .recipe_repository
        .find(user.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(recipe))
}

/// Replace a recipe; `title`, `time_minutes` and `price` are required
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<RecipePayload>, ApiError>,
) -> ApiResult<Json<RecipeDetail>> {
    apply_update(&state, user, id, payload, false).await
}

/// Update only the fields present in the body
pub async fn partial_update_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<RecipePayload>, ApiError>,
) -> ApiResult<Json<RecipeDetail>> {
    apply_update(&state, user, id, payload, true).await
}

async fn apply_update(
    state: &AppState,
    user: AuthUser,
    id: i64,
    payload: RecipePayload,
    partial: bool,
) -> ApiResult<Json<RecipeDetail>> {
    let changes = payload.into_changes(partial)?;
    let recipe = state
        .recipe_repository
        .update(user.id, id, &changes)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(recipe))
}

/// Delete one of the caller's recipes
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<StatusCode> {
    if state.recipe_repository.delete(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
