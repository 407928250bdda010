//! Tag and ingredient endpoints
//!
//! Every handler is generic over the entity, so `/tags` and `/ingredients`
//! share one implementation.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    filters,
    middleware::AuthUser,
    models::{
        NamedEntity,
        named::{NamedListParams, UpdateNamedRequest},
    },
};

/// List the caller's entities; `assigned_only=1` keeps those used by a recipe
pub async fn list<E: NamedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(params), _): WithRejection<Query<NamedListParams>, ApiError>,
) -> ApiResult<Json<Vec<E>>> {
    let assigned_only = filters::assigned_only(&params)?;
    let entities = state.named::<E>().list(user.id, assigned_only).await?;

    Ok(Json(entities))
}

/// Rename an entity; the body must contain `name`
pub async fn update<E: NamedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateNamedRequest>, ApiError>,
) -> ApiResult<Json<E>> {
    rename::<E>(&state, user, id, request, false).await
}

/// Rename an entity if the body contains `name`
pub async fn partial_update<E: NamedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateNamedRequest>, ApiError>,
) -> ApiResult<Json<E>> {
    rename::<E>(&state, user, id, request, true).await
}

async fn rename<E: NamedEntity>(
    state: &AppState,
    user: AuthUser,
    id: i64,
    request: UpdateNamedRequest,
    partial: bool,
) -> ApiResult<Json<E>> {
    let name = request.into_name(partial)?;
    let entity = state
        .named::<E>()
        .update(user.id, id, name.as_deref())
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(entity))
}

/// Delete an entity; recipes that used it simply lose the link
pub async fn delete<E: NamedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<StatusCode> {
    if state.named::<E>().delete(user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
