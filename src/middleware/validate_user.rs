use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;

/// Middleware that checks the token's user still exists.
/// Must run after [`super::jwt_auth_middleware`].
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    // the transaction must be closed before the handler opens its own
    let exists = {
        let mut tx = state.store.begin().await?;
        let user = tx.find_user(auth_user.id).await?;
        tx.commit().await?;
        user.is_some()
    };

    if !exists {
        tracing::warn!("User validation failed: user {} no longer exists", auth_user.id);
        return Err(ApiError::unauthorized("User not found."));
    }

    tracing::debug!("User validation successful: {}", auth_user.id);

    Ok(next.run(request).await)
}
