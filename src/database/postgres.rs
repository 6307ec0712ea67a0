use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Board, BoardPatch, Card, CardPatch, List, ListPatch, NewCard, User};
use crate::database::store::{Store, StoreTx};
use crate::types::{CardQuery, SortDirection};

const USER_COLUMNS: &str = "id, email, password, created_at, updated_at";
const BOARD_COLUMNS: &str = "id, name, user_id, created_at, updated_at";
const LIST_COLUMNS: &str = r#"id, name, board_id, "order", created_at, updated_at"#;
const CARD_COLUMNS: &str = r#"id, company_name, role_name, list_id, user_id, "order", created_at, updated_at"#;

/// Postgres-backed store; each `begin` opens a real database transaction
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

/// Flat row for the list + board join
#[derive(FromRow)]
struct ListBoardRow {
    id: Uuid,
    name: String,
    board_id: Uuid,
    order: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    board_name: String,
    board_user_id: Uuid,
    board_created_at: DateTime<Utc>,
    board_updated_at: DateTime<Utc>,
}

impl ListBoardRow {
    fn into_parts(self) -> (List, Board) {
        let board = Board {
            id: self.board_id,
            name: self.board_name,
            user_id: self.board_user_id,
            created_at: self.board_created_at,
            updated_at: self.board_updated_at,
        };
        let list = List {
            id: self.id,
            name: self.name,
            board_id: self.board_id,
            order: self.order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (list, board)
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn create_user(&mut self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!("INSERT INTO users (email, password) VALUES ($1, $2) RETURNING {USER_COLUMNS}");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    async fn find_board(&mut self, id: Uuid) -> Result<Option<Board>, DatabaseError> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1");
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(board)
    }

    async fn find_boards_by_user(&mut self, user_id: Uuid) -> Result<Vec<Board>, DatabaseError> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE user_id = $1 ORDER BY created_at ASC, id ASC");
        let boards = sqlx::query_as::<_, Board>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(boards)
    }

    async fn create_board(&mut self, user_id: Uuid, name: &str) -> Result<Board, DatabaseError> {
        let sql = format!("INSERT INTO boards (name, user_id) VALUES ($1, $2) RETURNING {BOARD_COLUMNS}");
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(name)
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(board)
    }

    async fn update_board(&mut self, id: Uuid, patch: &BoardPatch) -> Result<Board, DatabaseError> {
        let sql = format!(
            "UPDATE boards SET name = COALESCE($2, name), updated_at = NOW() WHERE id = $1 RETURNING {BOARD_COLUMNS}"
        );
        let board = sqlx::query_as::<_, Board>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(board)
    }

    async fn delete_board(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("board {id}")));
        }
        Ok(())
    }

    async fn lock_board(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("SELECT id FROM boards WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_list(&mut self, id: Uuid) -> Result<Option<List>, DatabaseError> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = $1");
        let list = sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(list)
    }

    async fn find_list_with_board(&mut self, id: Uuid) -> Result<Option<(List, Board)>, DatabaseError> {
        let row = sqlx::query_as::<_, ListBoardRow>(
            r#"
            SELECT l.id, l.name, l.board_id, l."order", l.created_at, l.updated_at,
                   b.name AS board_name, b.user_id AS board_user_id,
                   b.created_at AS board_created_at, b.updated_at AS board_updated_at
            FROM lists l
            JOIN boards b ON b.id = l.board_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(ListBoardRow::into_parts))
    }

    async fn find_lists_by_board(
        &mut self,
        board_id: Uuid,
        direction: SortDirection,
    ) -> Result<Vec<List>, DatabaseError> {
        let dir = direction.to_sql();
        let sql = format!(
            r#"SELECT {LIST_COLUMNS} FROM lists WHERE board_id = $1 ORDER BY "order" {dir}, created_at {dir}, id {dir}"#
        );
        let lists = sqlx::query_as::<_, List>(&sql)
            .bind(board_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(lists)
    }

    async fn create_list(&mut self, board_id: Uuid, name: &str, order: f64) -> Result<List, DatabaseError> {
        let sql = format!(
            r#"INSERT INTO lists (name, board_id, "order") VALUES ($1, $2, $3) RETURNING {LIST_COLUMNS}"#
        );
        let list = sqlx::query_as::<_, List>(&sql)
            .bind(name)
            .bind(board_id)
            .bind(order)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(list)
    }

    async fn update_list(&mut self, id: Uuid, patch: &ListPatch) -> Result<List, DatabaseError> {
        let sql = format!(
            r#"UPDATE lists SET name = COALESCE($2, name), "order" = COALESCE($3, "order"), updated_at = NOW()
               WHERE id = $1 RETURNING {LIST_COLUMNS}"#
        );
        let list = sqlx::query_as::<_, List>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.order)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(list)
    }

    async fn delete_list(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("list {id}")));
        }
        Ok(())
    }

    async fn lock_list(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("SELECT id FROM lists WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        let card = sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(card)
    }

    async fn lock_card(&mut self, id: Uuid) -> Result<Option<Card>, DatabaseError> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 FOR UPDATE");
        let card = sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(card)
    }

    async fn find_cards_by_list(&mut self, list_id: Uuid, query: &CardQuery) -> Result<Vec<Card>, DatabaseError> {
        let dir = query.direction.to_sql();
        let sql = format!(
            r#"SELECT {CARD_COLUMNS} FROM cards
               WHERE list_id = $1 AND ($2::uuid IS NULL OR id <> $2)
               ORDER BY "order" {dir}, created_at {dir}, id {dir}
               LIMIT $3 OFFSET COALESCE($4, 0)"#
        );
        let cards = sqlx::query_as::<_, Card>(&sql)
            .bind(list_id)
            .bind(query.exclude_id)
            .bind(query.take)
            .bind(query.skip)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(cards)
    }

    async fn count_cards_by_list(&mut self, list_id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards WHERE list_id = $1")
            .bind(list_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count.0)
    }

    async fn create_card(&mut self, card: &NewCard) -> Result<Card, DatabaseError> {
        let sql = format!(
            r#"INSERT INTO cards (company_name, role_name, list_id, user_id, "order")
               VALUES ($1, $2, $3, $4, $5) RETURNING {CARD_COLUMNS}"#
        );
        let created = sqlx::query_as::<_, Card>(&sql)
            .bind(&card.company_name)
            .bind(&card.role_name)
            .bind(card.list_id)
            .bind(card.user_id)
            .bind(card.order)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(created)
    }

    async fn update_card(&mut self, id: Uuid, patch: &CardPatch) -> Result<Card, DatabaseError> {
        let sql = format!(
            r#"UPDATE cards SET
                   company_name = COALESCE($2, company_name),
                   role_name = COALESCE($3, role_name),
                   list_id = COALESCE($4, list_id),
                   "order" = COALESCE($5, "order"),
                   updated_at = NOW()
               WHERE id = $1 RETURNING {CARD_COLUMNS}"#
        );
        let card = sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .bind(patch.company_name.as_deref())
            .bind(patch.role_name.as_deref())
            .bind(patch.list_id)
            .bind(patch.order)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(card)
    }

    async fn delete_card(&mut self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("card {id}")));
        }
        Ok(())
    }

    async fn renumber_cards(&mut self, list_id: Uuid, orders: &[(Uuid, f64)]) -> Result<u64, DatabaseError> {
        let (ids, values): (Vec<Uuid>, Vec<f64>) = orders.iter().copied().unzip();
        let result = sqlx::query(
            r#"
            UPDATE cards AS c SET "order" = v.new_order, updated_at = NOW()
            FROM UNNEST($2::uuid[], $3::float8[]) AS v(id, new_order)
            WHERE c.id = v.id AND c.list_id = $1
            "#,
        )
        .bind(list_id)
        .bind(ids)
        .bind(values)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}
