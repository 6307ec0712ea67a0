use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Card, List, ListPatch};
use crate::database::store::Store;
use crate::services::error::ServiceError;
use crate::services::ordering::append_order;
use crate::services::ownership::{authorize_board, authorize_list};
use crate::types::{CardQuery, MessageResponse, Pagination, SortDirection};

/// A list with one page of its cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn Store>,
}

impl ListService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends a list after the board's current last list
    pub async fn create(&self, user_id: Uuid, board_id: Uuid, name: &str) -> Result<List, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_board(&mut *tx, board_id, user_id).await?;
        tx.lock_board(board_id).await?;

        let last = tx.find_lists_by_board(board_id, SortDirection::Desc).await?;
        let order = append_order(last.first().map(|list| list.order));
        let list = tx.create_list(board_id, name, order).await?;
        tx.commit().await?;

        info!("Created list {} on board {} at order {}", list.id, board_id, order);
        Ok(list)
    }

    /// Count and page are read in the same transaction
    pub async fn get_list_by_id(
        &self,
        list_id: Uuid,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<ListPage, ServiceError> {
        let mut tx = self.store.begin().await?;
        let authorized = authorize_list(&mut *tx, list_id, user_id).await?;

        let cards = tx.find_cards_by_list(list_id, &CardQuery::page(page, limit)).await?;
        let total = tx.count_cards_by_list(list_id).await?;
        tx.commit().await?;

        Ok(ListPage {
            list: authorized.list,
            cards,
            pagination: Pagination::new(total, page, limit),
        })
    }

    pub async fn update(&self, list_id: Uuid, user_id: Uuid, patch: ListPatch) -> Result<List, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_list(&mut *tx, list_id, user_id).await?;
        let list = tx.update_list(list_id, &patch).await?;
        tx.commit().await?;
        Ok(list)
    }

    /// Deletes the list and its cards
    pub async fn remove(&self, list_id: Uuid, user_id: Uuid) -> Result<MessageResponse, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_list(&mut *tx, list_id, user_id).await?;
        tx.delete_list(list_id).await?;
        tx.commit().await?;

        info!("Deleted list {}", list_id);
        Ok(MessageResponse::new("List deleted successfully."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewCard;
    use crate::database::MemoryStore;

    struct Setup {
        store: Arc<MemoryStore>,
        service: ListService,
        owner: Uuid,
        other: Uuid,
        board: Uuid,
    }

    async fn setup() -> Setup {
        let store = Arc::new(MemoryStore::new());
        let mut tx = store.begin().await.unwrap();
        let owner = tx.create_user("owner@example.com", "hash").await.unwrap().id;
        let other = tx.create_user("other@example.com", "hash").await.unwrap().id;
        let board = tx.create_board(owner, "Jobs").await.unwrap().id;
        tx.commit().await.unwrap();
        let service = ListService::new(store.clone());
        Setup { store, service, owner, other, board }
    }

    #[tokio::test]
    async fn lists_append_from_zero() {
        let s = setup().await;
        let first = s.service.create(s.owner, s.board, "Wishlist").await.unwrap();
        let second = s.service.create(s.owner, s.board, "Applied").await.unwrap();
        assert_eq!(first.order, 0.0);
        assert_eq!(second.order, 1.0);
    }

    #[tokio::test]
    async fn create_on_foreign_board_is_forbidden() {
        let s = setup().await;
        assert!(matches!(
            s.service.create(s.other, s.board, "Sneaky").await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            s.service.create(s.owner, Uuid::new_v4(), "Nowhere").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_page_reports_pagination() {
        let s = setup().await;
        let list = s.service.create(s.owner, s.board, "Applied").await.unwrap();

        let mut tx = s.store.begin().await.unwrap();
        for i in 0..5 {
            tx.create_card(&NewCard {
                company_name: format!("Company {i}"),
                role_name: "Dev".into(),
                list_id: list.id,
                user_id: s.owner,
                order: i as f64,
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let page = s.service.get_list_by_id(list.id, s.owner, 2, 2).await.unwrap();
        let names: Vec<&str> = page.cards.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Company 2", "Company 3"]);
        assert_eq!(page.pagination, Pagination { total: 5, page: 2, limit: 2, total_pages: 3 });

        let past_end = s.service.get_list_by_id(list.id, s.owner, 9, 2).await.unwrap();
        assert!(past_end.cards.is_empty());
        assert_eq!(past_end.pagination.total, 5);
    }

    #[tokio::test]
    async fn update_and_remove_require_ownership() {
        let s = setup().await;
        let list = s.service.create(s.owner, s.board, "Offer").await.unwrap();

        let patch = ListPatch { name: Some("Hijacked".into()), order: None };
        assert!(matches!(
            s.service.update(list.id, s.other, patch).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            s.service.remove(list.id, s.other).await,
            Err(ServiceError::Forbidden(_))
        ));

        let renamed = s
            .service
            .update(list.id, s.owner, ListPatch { name: Some("Offers".into()), order: Some(4.5) })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Offers");
        assert_eq!(renamed.order, 4.5);

        s.service.remove(list.id, s.owner).await.unwrap();
        assert!(matches!(
            s.service.get_list_by_id(list.id, s.owner, 1, 10).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
