//! Ownership chain checks: card -> list -> board -> user.
//!
//! Every check runs inside the caller's transaction so the entity it
//! returns is the one the following writes act on.

use tracing::warn;
use uuid::Uuid;

use crate::database::models::{Board, Card, List};
use crate::database::store::StoreTx;
use crate::services::error::ServiceError;

/// A list together with the board that owns it
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedList {
    pub list: List,
    pub board: Board,
}

pub async fn authorize_board(
    tx: &mut dyn StoreTx,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<Board, ServiceError> {
    let board = tx
        .find_board(board_id)
        .await?
        .ok_or_else(|| {
            warn!("Board {} not found", board_id);
            ServiceError::not_found(format!("Board with ID {board_id} not found."))
        })?;

    if board.user_id != user_id {
        warn!("User {} does not own board {}", user_id, board_id);
        return Err(ServiceError::forbidden("You do not have permission to access this board."));
    }

    Ok(board)
}

pub async fn authorize_list(
    tx: &mut dyn StoreTx,
    list_id: Uuid,
    user_id: Uuid,
) -> Result<AuthorizedList, ServiceError> {
    let (list, board) = tx
        .find_list_with_board(list_id)
        .await?
        .ok_or_else(|| {
            warn!("List {} not found", list_id);
            ServiceError::not_found(format!("List with ID {list_id} not found."))
        })?;

    if board.user_id != user_id {
        warn!("User {} does not own list {} (board {})", user_id, list_id, board.id);
        return Err(ServiceError::forbidden("You do not have permission to access this list."));
    }

    Ok(AuthorizedList { list, board })
}

/// Checks the card's own `user_id`, without walking to the board. Cards
/// are only created under lists already verified for the same user.
pub async fn authorize_card(
    tx: &mut dyn StoreTx,
    card_id: Uuid,
    user_id: Uuid,
) -> Result<Card, ServiceError> {
    let card = tx
        .find_card(card_id)
        .await?
        .ok_or_else(|| {
            warn!("Card {} not found", card_id);
            ServiceError::not_found(format!("Card with ID {card_id} not found."))
        })?;

    if card.user_id != user_id {
        warn!("User {} does not own card {}", user_id, card_id);
        return Err(ServiceError::forbidden("Permission denied."));
    }

    Ok(card)
}

/// Same chain as [`authorize_list`], for the destination of a card move.
/// Independent of where the card currently lives.
pub async fn authorize_list_for_card_target(
    tx: &mut dyn StoreTx,
    list_id: Uuid,
    user_id: Uuid,
) -> Result<AuthorizedList, ServiceError> {
    authorize_list(tx, list_id, user_id).await.map_err(|err| match err {
        ServiceError::Forbidden(_) => {
            ServiceError::forbidden("You do not have permission to move a card to this list.")
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewCard;
    use crate::database::store::Store;
    use crate::database::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        owner: Uuid,
        stranger: Uuid,
        board: Uuid,
        list: Uuid,
        card: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let owner = tx.create_user("owner@example.com", "hash").await.unwrap().id;
        let stranger = tx.create_user("stranger@example.com", "hash").await.unwrap().id;
        let board = tx.create_board(owner, "Jobs").await.unwrap().id;
        let list = tx.create_list(board, "Applied", 0.0).await.unwrap().id;
        let card = tx
            .create_card(&NewCard {
                company_name: "Acme".into(),
                role_name: "Engineer".into(),
                list_id: list,
                user_id: owner,
                order: 0.0,
            })
            .await
            .unwrap()
            .id;
        tx.commit().await.unwrap();
        Fixture { store, owner, stranger, board, list, card }
    }

    #[tokio::test]
    async fn owner_passes_every_check() {
        let f = fixture().await;
        let mut tx = f.store.begin().await.unwrap();
        assert_eq!(authorize_board(&mut *tx, f.board, f.owner).await.unwrap().id, f.board);
        let authorized = authorize_list(&mut *tx, f.list, f.owner).await.unwrap();
        assert_eq!(authorized.board.id, f.board);
        assert_eq!(authorize_card(&mut *tx, f.card, f.owner).await.unwrap().id, f.card);
        assert!(authorize_list_for_card_target(&mut *tx, f.list, f.owner).await.is_ok());
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let f = fixture().await;
        let mut tx = f.store.begin().await.unwrap();
        assert!(matches!(
            authorize_board(&mut *tx, f.board, f.stranger).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_list(&mut *tx, f.list, f.stranger).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_card(&mut *tx, f.card, f.stranger).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            authorize_list_for_card_target(&mut *tx, f.list, f.stranger).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_entities_are_not_found() {
        let f = fixture().await;
        let mut tx = f.store.begin().await.unwrap();
        let missing = Uuid::new_v4();
        assert!(matches!(authorize_board(&mut *tx, missing, f.owner).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(authorize_list(&mut *tx, missing, f.owner).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(authorize_card(&mut *tx, missing, f.owner).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn card_check_uses_card_owner_only() {
        // a card whose own user_id differs from the board owner is denied
        // even though the list chain would pass
        let f = fixture().await;
        let mut tx = f.store.begin().await.unwrap();
        let foreign = tx
            .create_card(&NewCard {
                company_name: "Globex".into(),
                role_name: "Analyst".into(),
                list_id: f.list,
                user_id: f.stranger,
                order: 1.0,
            })
            .await
            .unwrap();
        assert!(matches!(
            authorize_card(&mut *tx, foreign.id, f.owner).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(authorize_card(&mut *tx, foreign.id, f.stranger).await.is_ok());
    }
}
