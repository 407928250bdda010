//! Middleware for bearer token validation and authentication

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tracing::{error, warn};

use crate::{AppState, error::AuthError};

/// Validate the bearer token and load the active user it names
///
/// The [`User`](crate::models::User) is added to the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Unauthorized)?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        AuthError::Unauthorized
    })?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", claims.sub, e);
            AuthError::InternalServerError
        })?
        .filter(|user| user.is_active)
        .ok_or(AuthError::Unauthorized)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
