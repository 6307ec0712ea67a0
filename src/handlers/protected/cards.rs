// handlers/protected/cards.rs - /cards, /cards/:id and /cards/:id/move

use axum::extract::{Extension, Path, State};

use crate::api::requests::{CreateCardRequest, MoveCardRequest, UpdateCardRequest};
use crate::api::{parse_id, ApiJson};
use crate::app::AppState;
use crate::database::models::Card;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::MessageResponse;

/// POST /cards - append a card to one of the caller's lists
///
/// Expected Input:
/// ```json
/// { "companyName": "Acme", "roleName": "Engineer", "listId": "uuid" }
/// ```
pub async fn card_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateCardRequest>,
) -> ApiResult<Card> {
    let list_id = body.validate()?;
    let card = state
        .cards
        .create(user.id, list_id, body.company_name.trim(), body.role_name.trim())
        .await?;
    Ok(ApiResponse::created(card))
}

pub async fn card_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCardRequest>,
) -> ApiResult<Card> {
    let card_id = parse_id(&id)?;
    let patch = body.validate()?;
    let card = state.cards.update(card_id, user.id, patch).await?;
    Ok(ApiResponse::success(card))
}

/// PATCH /cards/:id/move - place the card at index `newOrder` of `newListId`
///
/// Expected Input:
/// ```json
/// { "newListId": "uuid", "newOrder": 0 }
/// ```
pub async fn card_move(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MoveCardRequest>,
) -> ApiResult<Card> {
    let card_id = parse_id(&id)?;
    let (new_list_id, target_index) = body.validate()?;
    let card = state
        .cards
        .move_card(card_id, user.id, new_list_id, target_index)
        .await?;
    Ok(ApiResponse::success(card))
}

pub async fn card_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let card_id = parse_id(&id)?;
    let message = state.cards.remove(card_id, user.id).await?;
    Ok(ApiResponse::success(message))
}
