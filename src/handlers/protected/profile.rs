// handlers/protected/profile.rs - GET /profile

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

pub async fn profile_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PublicUser> {
    let profile = state.accounts.profile(user.id).await?;
    Ok(ApiResponse::success(profile))
}
