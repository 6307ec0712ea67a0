/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sort direction for order-ranked queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Options for listing the cards of one list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardQuery {
    pub direction: SortDirection,
    /// Leave this card out of the result (the card being moved)
    pub exclude_id: Option<Uuid>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

impl CardQuery {
    pub fn ascending() -> Self {
        Self::default()
    }

    pub fn excluding(card_id: Uuid) -> Self {
        Self {
            exclude_id: Some(card_id),
            ..Default::default()
        }
    }

    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            skip: Some(i64::from(page.saturating_sub(1)) * i64::from(limit)),
            take: Some(i64::from(limit)),
            ..Default::default()
        }
    }
}

/// Pagination block returned alongside a page of cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit_i - 1) / limit_i,
        }
    }
}

/// Plain confirmation body for deletions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
