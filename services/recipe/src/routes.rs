//! Recipe service routes

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::auth_middleware,
    models::{Ingredient, Tag},
};

pub mod named;
pub mod recipes;

/// Create the router for the recipe service
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .patch(recipes::partial_update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/tags", get(named::list::<Tag>))
        .route(
            "/tags/:id",
            put(named::update::<Tag>)
                .patch(named::partial_update::<Tag>)
                .delete(named::delete::<Tag>),
        )
        .route("/ingredients", get(named::list::<Ingredient>))
        .route(
            "/ingredients/:id",
            put(named::update::<Ingredient>)
                .patch(named::partial_update::<Ingredient>)
                .delete(named::delete::<Ingredient>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/recipe", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "recipe-service"
    }))
}
