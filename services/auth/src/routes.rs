//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use common::error::FieldError;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    AppState,
    error::AuthError,
    middleware::auth_middleware,
    models::{
        CreateUserRequest, LoginRequest, NewUser, TokenResponse, UpdateUser, UpdateUserRequest,
        User, UserResponse,
    },
    password::{hash_password, verify_password},
    validation::{normalize_email, validate_email, validate_name, validate_password},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/me",
            get(get_me).put(update_me).patch(partial_update_me),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/create", post(create_user))
        .route("/token", post(create_token))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/user", user_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, AuthError>,
) -> Result<impl IntoResponse, AuthError> {
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    let name = validate_name(&payload.name)?;

    let new_user = NewUser {
        email,
        name,
        password_hash: hash(&payload.password)?,
    };

    let user = state.user_repository.create(&new_user).await?;
    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Issue an access token for an email and password
pub async fn create_token(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AuthError>,
) -> Result<Json<TokenResponse>, AuthError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(FieldError::new("email", "This field may not be blank.").into());
    }
    if payload.password.is_empty() {
        return Err(FieldError::new("password", "This field may not be blank.").into());
    }

    info!("Token request for: {}", email);

    let user = state
        .user_repository
        .find_by_email(&normalize_email(email))
        .await?
        .filter(|user| user.is_active)
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!("Failed to verify password: {}", e);
        AuthError::InternalServerError
    })?;

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    let token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// The authenticated user
pub async fn get_me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Replace the authenticated user's email, name and password
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUserRequest>, AuthError>,
) -> Result<Json<UserResponse>, AuthError> {
    apply_update(&state, user, payload, false).await
}

/// Update the fields present in the body
pub async fn partial_update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUserRequest>, AuthError>,
) -> Result<Json<UserResponse>, AuthError> {
    apply_update(&state, user, payload, true).await
}

async fn apply_update(
    state: &AppState,
    user: User,
    payload: UpdateUserRequest,
    partial: bool,
) -> Result<Json<UserResponse>, AuthError> {
    let changes = user_changes(payload, partial)?;

    let updated = state
        .user_repository
        .update(user.id, &changes)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserResponse::from(updated)))
}

/// Validate a profile update; a full update requires every field
pub fn user_changes(payload: UpdateUserRequest, partial: bool) -> Result<UpdateUser, AuthError> {
    if !partial {
        for (field, present) in [
            ("email", payload.email.is_some()),
            ("name", payload.name.is_some()),
            ("password", payload.password.is_some()),
        ] {
            if !present {
                return Err(FieldError::new(field, "This field is required.").into());
            }
        }
    }

    let email = payload.email.as_deref().map(validate_email).transpose()?;
    let name = payload.name.as_deref().map(validate_name).transpose()?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    Ok(UpdateUser {
        email,
        name,
        password_hash,
    })
}

fn hash(password: &str) -> Result<String, AuthError> {
    hash_password(password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::InternalServerError
    })
}
