//! Repository seam between the services and storage.
//!
//! Every service operation opens one [`StoreTx`], performs its reads and
//! writes through it and commits. Dropping a transaction without calling
//! [`StoreTx::commit`] rolls everything back, so an early `?` return on a
//! `NotFound`/`Forbidden` leaves no partial writes behind.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Board, BoardPatch, Card, CardPatch, List, ListPatch, NewCard, User};
use crate::types::{CardQuery, SortDirection};

#[async_trait]
pub trait Store: Send + Sync {
    /// Start an all-or-nothing unit of work
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError>;

    /// Cheap connectivity check for /health
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait StoreTx: Send {
    // Users
    async fn create_user(&mut self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError>;

    // Boards
    async fn find_board(&mut self, id: Uuid) -> Result<Option<Board>, DatabaseError>;
    /// Boards of one user, oldest first
    async fn find_boards_by_user(&mut self, user_id: Uuid) -> Result<Vec<Board>, DatabaseError>;
    async fn create_board(&mut self, user_id: Uuid, name: &str) -> Result<Board, DatabaseError>;
    async fn update_board(&mut self, id: Uuid, patch: &BoardPatch) -> Result<Board, DatabaseError>;
    /// Cascades to the board's lists and their cards
    async fn delete_board(&mut self, id: Uuid) -> Result<(), DatabaseError>;
    /// Write-lock the board row so list appends on one board run one at a time
    async fn lock_board(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    // Lists
    async fn find_list(&mut self, id: Uuid) -> Result<Option<List>, DatabaseError>;
    async fn find_list_with_board(&mut self, id: Uuid) -> Result<Option<(List, Board)>, DatabaseError>;
    async fn find_lists_by_board(
        &mut self,
        board_id: Uuid,
        direction: SortDirection,
    ) -> Result<Vec<List>, DatabaseError>;
    async fn create_list(&mut self, board_id: Uuid, name: &str, order: f64) -> Result<List, DatabaseError>;
    async fn update_list(&mut self, id: Uuid, patch: &ListPatch) -> Result<List, DatabaseError>;
    /// Cascades to the list's cards
    async fn delete_list(&mut self, id: Uuid) -> Result<(), DatabaseError>;
    /// Hold a write lock on the list row until the transaction ends, so
    /// concurrent placements into the same list read neighbours serially.
    /// Callers taking two list locks take them in ascending id order.
    async fn lock_list(&mut self, id: Uuid) -> Result<(), DatabaseError>;

    // Cards
    async fn find_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError>;
    /// Re-read the card under a row lock held until the transaction ends
    async fn lock_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError>;
    async fn find_cards_by_list(&mut self, list_id: Uuid, query: &CardQuery) -> Result<Vec<Card>, DatabaseError>;
    async fn count_cards_by_list(&mut self, list_id: Uuid) -> Result<i64, DatabaseError>;
    async fn create_card(&mut self, card: &NewCard) -> Result<Card, DatabaseError>;
    async fn update_card(&mut self, id: Uuid, patch: &CardPatch) -> Result<Card, DatabaseError>;
    async fn delete_card(&mut self, id: Uuid) -> Result<(), DatabaseError>;
    /// Set new orders on cards that are still in `list_id`; cards that have
    /// left the list are skipped. Returns how many cards were written.
    async fn renumber_cards(&mut self, list_id: Uuid, orders: &[(Uuid, f64)]) -> Result<u64, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}
