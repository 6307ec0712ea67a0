//! In-process store with the same transactional contract as Postgres.
//!
//! A transaction holds the store lock for its whole lifetime and works on
//! a private copy of the tables; `commit` swaps the copy in, dropping the
//! transaction discards it. Transactions are therefore fully serialized.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Board, BoardPatch, Card, CardPatch, List, ListPatch, NewCard, User};
use crate::database::store::{Store, StoreTx};
use crate::types::{CardQuery, SortDirection};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    boards: Vec<Board>,
    lists: Vec<List>,
    cards: Vec<Card>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

fn sort_lists(lists: &mut [List], direction: SortDirection) {
    lists.sort_by(|a, b| {
        a.order
            .total_cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    if direction == SortDirection::Desc {
        lists.reverse();
    }
}

fn sort_cards(cards: &mut [Card], direction: SortDirection) {
    cards.sort_by(|a, b| {
        a.order
            .total_cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    if direction == SortDirection::Desc {
        cards.reverse();
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn create_user(&mut self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        if self.working.users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.working.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.working.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_board(&mut self, id: Uuid) -> Result<Option<Board>, DatabaseError> {
        Ok(self.working.boards.iter().find(|b| b.id == id).cloned())
    }

    async fn find_boards_by_user(&mut self, user_id: Uuid) -> Result<Vec<Board>, DatabaseError> {
        let mut boards: Vec<Board> = self
            .working
            .boards
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        // stable: insertion order breaks created_at ties
        boards.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(boards)
    }

    async fn create_board(&mut self, user_id: Uuid, name: &str) -> Result<Board, DatabaseError> {
        if !self.working.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::QueryError(format!("boards.user_id references missing user {user_id}")));
        }
        let now = Utc::now();
        let board = Board {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.working.boards.push(board.clone());
        Ok(board)
    }

    async fn update_board(&mut self, id: Uuid, patch: &BoardPatch) -> Result<Board, DatabaseError> {
        let board = self
            .working
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("board {id}")))?;
        if let Some(name) = &patch.name {
            board.name = name.clone();
        }
        board.updated_at = Utc::now();
        Ok(board.clone())
    }

    async fn delete_board(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let before = self.working.boards.len();
        self.working.boards.retain(|b| b.id != id);
        if self.working.boards.len() == before {
            return Err(DatabaseError::NotFound(format!("board {id}")));
        }
        let list_ids: Vec<Uuid> = self
            .working
            .lists
            .iter()
            .filter(|l| l.board_id == id)
            .map(|l| l.id)
            .collect();
        self.working.lists.retain(|l| l.board_id != id);
        self.working.cards.retain(|c| !list_ids.contains(&c.list_id));
        Ok(())
    }

    async fn lock_board(&mut self, _id: Uuid) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_list(&mut self, id: Uuid) -> Result<Option<List>, DatabaseError> {
        Ok(self.working.lists.iter().find(|l| l.id == id).cloned())
    }

    async fn find_list_with_board(&mut self, id: Uuid) -> Result<Option<(List, Board)>, DatabaseError> {
        let Some(list) = self.working.lists.iter().find(|l| l.id == id) else {
            return Ok(None);
        };
        let board = self
            .working
            .boards
            .iter()
            .find(|b| b.id == list.board_id)
            .ok_or_else(|| DatabaseError::QueryError(format!("list {id} has no board")))?;
        Ok(Some((list.clone(), board.clone())))
    }

    async fn find_lists_by_board(
        &mut self,
        board_id: Uuid,
        direction: SortDirection,
    ) -> Result<Vec<List>, DatabaseError> {
        let mut lists: Vec<List> = self
            .working
            .lists
            .iter()
            .filter(|l| l.board_id == board_id)
            .cloned()
            .collect();
        sort_lists(&mut lists, direction);
        Ok(lists)
    }

    async fn create_list(&mut self, board_id: Uuid, name: &str, order: f64) -> Result<List, DatabaseError> {
        if !self.working.boards.iter().any(|b| b.id == board_id) {
            return Err(DatabaseError::QueryError(format!("lists.board_id references missing board {board_id}")));
        }
        let now = Utc::now();
        let list = List {
            id: Uuid::new_v4(),
            name: name.to_string(),
            board_id,
            order,
            created_at: now,
            updated_at: now,
        };
        self.working.lists.push(list.clone());
        Ok(list)
    }

    async fn update_list(&mut self, id: Uuid, patch: &ListPatch) -> Result<List, DatabaseError> {
        let list = self
            .working
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("list {id}")))?;
        if let Some(name) = &patch.name {
            list.name = name.clone();
        }
        if let Some(order) = patch.order {
            list.order = order;
        }
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_list(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let before = self.working.lists.len();
        self.working.lists.retain(|l| l.id != id);
        if self.working.lists.len() == before {
            return Err(DatabaseError::NotFound(format!("list {id}")));
        }
        self.working.cards.retain(|c| c.list_id != id);
        Ok(())
    }

    async fn lock_list(&mut self, _id: Uuid) -> Result<(), DatabaseError> {
        // the store-wide lock is already held
        Ok(())
    }

    async fn find_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError> {
        Ok(self.working.cards.iter().find(|c| c.id == id).cloned())
    }

    async fn lock_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError> {
        self.find_card(id).await
    }

    async fn find_cards_by_list(&mut self, list_id: Uuid, query: &CardQuery) -> Result<Vec<Card>, DatabaseError> {
        let mut cards: Vec<Card> = self
            .working
            .cards
            .iter()
            .filter(|c| c.list_id == list_id && Some(c.id) != query.exclude_id)
            .cloned()
            .collect();
        sort_cards(&mut cards, query.direction);

        let skip = usize::try_from(query.skip.unwrap_or(0).max(0)).unwrap_or(usize::MAX);
        let take = match query.take {
            Some(take) => usize::try_from(take.max(0)).unwrap_or(usize::MAX),
            None => usize::MAX,
        };
        Ok(cards.into_iter().skip(skip).take(take).collect())
    }

    async fn count_cards_by_list(&mut self, list_id: Uuid) -> Result<i64, DatabaseError> {
        let count = self.working.cards.iter().filter(|c| c.list_id == list_id).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn create_card(&mut self, card: &NewCard) -> Result<Card, DatabaseError> {
        if !self.working.lists.iter().any(|l| l.id == card.list_id) {
            return Err(DatabaseError::QueryError(format!("cards.list_id references missing list {}", card.list_id)));
        }
        let now = Utc::now();
        let created = Card {
            id: Uuid::new_v4(),
            company_name: card.company_name.clone(),
            role_name: card.role_name.clone(),
            list_id: card.list_id,
            user_id: card.user_id,
            order: card.order,
            created_at: now,
            updated_at: now,
        };
        self.working.cards.push(created.clone());
        Ok(created)
    }

    async fn update_card(&mut self, id: Uuid, patch: &CardPatch) -> Result<Card, DatabaseError> {
        if let Some(list_id) = patch.list_id {
            if !self.working.lists.iter().any(|l| l.id == list_id) {
                return Err(DatabaseError::QueryError(format!("cards.list_id references missing list {list_id}")));
            }
        }
        let card = self
            .working
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("card {id}")))?;
        if let Some(company_name) = &patch.company_name {
            card.company_name = company_name.clone();
        }
        if let Some(role_name) = &patch.role_name {
            card.role_name = role_name.clone();
        }
        if let Some(list_id) = patch.list_id {
            card.list_id = list_id;
        }
        if let Some(order) = patch.order {
            card.order = order;
        }
        card.updated_at = Utc::now();
        Ok(card.clone())
    }

    async fn delete_card(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let before = self.working.cards.len();
        self.working.cards.retain(|c| c.id != id);
        if self.working.cards.len() == before {
            return Err(DatabaseError::NotFound(format!("card {id}")));
        }
        Ok(())
    }

    async fn renumber_cards(&mut self, list_id: Uuid, orders: &[(Uuid, f64)]) -> Result<u64, DatabaseError> {
        let now = Utc::now();
        let mut written = 0;
        for card in self.working.cards.iter_mut().filter(|c| c.list_id == list_id) {
            if let Some((_, order)) = orders.iter().find(|(id, _)| *id == card.id) {
                card.order = *order;
                card.updated_at = now;
                written += 1;
            }
        }
        Ok(written)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
