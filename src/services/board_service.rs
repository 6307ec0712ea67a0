use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{Board, BoardDetail, BoardPatch, ListWithCards};
use crate::database::store::Store;
use crate::services::error::ServiceError;
use crate::services::ownership::authorize_board;
use crate::types::{CardQuery, MessageResponse, SortDirection};

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn Store>,
}

impl BoardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_board(&self, user_id: Uuid, name: &str) -> Result<Board, ServiceError> {
        let mut tx = self.store.begin().await?;
        let board = tx.create_board(user_id, name).await?;
        tx.commit().await?;

        info!("Created board {} for user {}", board.id, user_id);
        Ok(board)
    }

    /// Boards of the user, oldest first, without lists or cards
    pub async fn get_boards(&self, user_id: Uuid) -> Result<Vec<Board>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let boards = tx.find_boards_by_user(user_id).await?;
        tx.commit().await?;
        Ok(boards)
    }

    /// The board with every list and card nested, each ordered ascending
    pub async fn get_board_by_id(&self, board_id: Uuid, user_id: Uuid) -> Result<BoardDetail, ServiceError> {
        let mut tx = self.store.begin().await?;
        let board = authorize_board(&mut *tx, board_id, user_id).await?;

        let lists = tx.find_lists_by_board(board.id, SortDirection::Asc).await?;
        let mut nested = Vec::with_capacity(lists.len());
        for list in lists {
            let cards = tx.find_cards_by_list(list.id, &CardQuery::ascending()).await?;
            nested.push(ListWithCards { list, cards });
        }
        tx.commit().await?;

        debug!("Loaded board {} with {} lists", board_id, nested.len());
        Ok(BoardDetail { board, lists: nested })
    }

    pub async fn update_board(
        &self,
        board_id: Uuid,
        user_id: Uuid,
        patch: BoardPatch,
    ) -> Result<Board, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_board(&mut *tx, board_id, user_id).await?;
        let board = tx.update_board(board_id, &patch).await?;
        tx.commit().await?;
        Ok(board)
    }

    /// Removes the board together with its lists and cards
    pub async fn delete_board(&self, board_id: Uuid, user_id: Uuid) -> Result<MessageResponse, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_board(&mut *tx, board_id, user_id).await?;
        tx.delete_board(board_id).await?;
        tx.commit().await?;

        info!("Deleted board {} of user {}", board_id, user_id);
        Ok(MessageResponse::new("Board deleted successfully."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewCard;
    use crate::database::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, BoardService, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let owner = tx.create_user("owner@example.com", "hash").await.unwrap().id;
        let other = tx.create_user("other@example.com", "hash").await.unwrap().id;
        tx.commit().await.unwrap();
        let service = BoardService::new(store.clone());
        (store, service, owner, other)
    }

    #[tokio::test]
    async fn boards_are_listed_per_user_oldest_first() {
        let (_, service, owner, other) = setup().await;
        let first = service.create_board(owner, "First").await.unwrap();
        let second = service.create_board(owner, "Second").await.unwrap();
        service.create_board(other, "Theirs").await.unwrap();

        let boards = service.get_boards(owner).await.unwrap();
        let ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn board_detail_nests_ordered_lists_and_cards() {
        let (store, service, owner, _) = setup().await;
        let board = service.create_board(owner, "Jobs").await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let later = tx.create_list(board.id, "Later", 1.0).await.unwrap();
        let sooner = tx.create_list(board.id, "Sooner", 0.0).await.unwrap();
        for (name, order) in [("B", 2.0), ("A", 1.0)] {
            tx.create_card(&NewCard {
                company_name: name.into(),
                role_name: "Dev".into(),
                list_id: sooner.id,
                user_id: owner,
                order,
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let detail = service.get_board_by_id(board.id, owner).await.unwrap();
        assert_eq!(detail.lists.len(), 2);
        assert_eq!(detail.lists[0].list.id, sooner.id);
        assert_eq!(detail.lists[1].list.id, later.id);
        let names: Vec<&str> = detail.lists[0].cards.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(detail.lists[1].cards.is_empty());
    }

    #[tokio::test]
    async fn foreign_board_is_forbidden_and_untouched() {
        let (_, service, owner, other) = setup().await;
        let board = service.create_board(owner, "Mine").await.unwrap();

        let patch = BoardPatch { name: Some("Stolen".into()) };
        assert!(matches!(
            service.update_board(board.id, other, patch).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete_board(board.id, other).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(service.get_board_by_id(board.id, owner).await.unwrap().board.name, "Mine");
    }

    #[tokio::test]
    async fn update_and_delete_own_board() {
        let (_, service, owner, _) = setup().await;
        let board = service.create_board(owner, "Old").await.unwrap();

        let updated = service
            .update_board(board.id, owner, BoardPatch { name: Some("New".into()) })
            .await
            .unwrap();
        assert_eq!(updated.name, "New");

        service.delete_board(board.id, owner).await.unwrap();
        assert!(matches!(
            service.get_board_by_id(board.id, owner).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
