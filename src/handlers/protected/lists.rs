// handlers/protected/lists.rs - /lists and /lists/:id

use axum::extract::{Extension, Path, Query, State};

use crate::api::requests::{CreateListRequest, PaginationQuery, UpdateListRequest};
use crate::api::{parse_id, ApiJson};
use crate::app::AppState;
use crate::database::models::List;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ListPage;
use crate::types::MessageResponse;

/// POST /lists - append a list to one of the caller's boards
///
/// Expected Input:
/// ```json
/// { "name": "Applied", "boardId": "uuid" }
/// ```
pub async fn list_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateListRequest>,
) -> ApiResult<List> {
    let board_id = body.validate()?;
    let list = state.lists.create(user.id, board_id, body.name.trim()).await?;
    Ok(ApiResponse::created(list))
}

/// GET /lists/:id?page=1&limit=10 - list with one page of cards
pub async fn list_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> ApiResult<ListPage> {
    let list_id = parse_id(&id)?;
    let (page, limit) = query.validate(&state.pagination)?;
    let list = state.lists.get_list_by_id(list_id, user.id, page, limit).await?;
    Ok(ApiResponse::success(list))
}

pub async fn list_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateListRequest>,
) -> ApiResult<List> {
    let list_id = parse_id(&id)?;
    let patch = body.validate()?;
    let list = state.lists.update(list_id, user.id, patch).await?;
    Ok(ApiResponse::success(list))
}

pub async fn list_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let list_id = parse_id(&id)?;
    let message = state.lists.remove(list_id, user.id).await?;
    Ok(ApiResponse::success(message))
}
