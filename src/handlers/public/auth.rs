// handlers/public/auth.rs - POST /auth/register and POST /auth/login

use axum::extract::State;

use crate::api::requests::{LoginRequest, RegisterRequest};
use crate::api::ApiJson;
use crate::app::AppState;
use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AccessToken;

/// POST /auth/register - create an account with its default board
///
/// Expected Input:
/// ```json
/// { "email": "jane@example.com", "password": "at least 6 chars" }
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<PublicUser> {
    body.validate(state.auth.password_min_length)?;
    let user = state.accounts.register(body.email.trim(), &body.password).await?;
    Ok(ApiResponse::created(user))
}

/// POST /auth/login - exchange credentials for `{ access_token }`
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<AccessToken> {
    body.validate()?;
    let token = state.accounts.login(body.email.trim(), &body.password).await?;
    Ok(ApiResponse::success(token))
}
