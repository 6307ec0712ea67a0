// handlers/protected/boards.rs - /boards and /boards/:id

use axum::extract::{Extension, Path, State};

use crate::api::requests::{CreateBoardRequest, UpdateBoardRequest};
use crate::api::{parse_id, ApiJson};
use crate::app::AppState;
use crate::database::models::{Board, BoardDetail};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::MessageResponse;

/// GET /boards - the caller's boards, without lists
pub async fn boards_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Board>> {
    let boards = state.boards.get_boards(user.id).await?;
    Ok(ApiResponse::success(boards))
}

pub async fn board_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateBoardRequest>,
) -> ApiResult<Board> {
    body.validate()?;
    let board = state.boards.create_board(user.id, body.name.trim()).await?;
    Ok(ApiResponse::created(board))
}

/// GET /boards/:id - board with nested lists and cards
pub async fn board_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<BoardDetail> {
    let board_id = parse_id(&id)?;
    let board = state.boards.get_board_by_id(board_id, user.id).await?;
    Ok(ApiResponse::success(board))
}

pub async fn board_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateBoardRequest>,
) -> ApiResult<Board> {
    let board_id = parse_id(&id)?;
    let patch = body.validate()?;
    let board = state.boards.update_board(board_id, user.id, patch).await?;
    Ok(ApiResponse::success(board))
}

pub async fn board_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let board_id = parse_id(&id)?;
    let message = state.boards.delete_board(board_id, user.id).await?;
    Ok(ApiResponse::success(message))
}
