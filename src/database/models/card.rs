use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job application. `user_id` duplicates the owning board's user so
/// ownership can be checked without walking card -> list -> board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub company_name: String,
    pub role_name: String,
    pub list_id: Uuid,
    pub user_id: Uuid,
    pub order: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub company_name: String,
    pub role_name: String,
    pub list_id: Uuid,
    pub user_id: Uuid,
    pub order: f64,
}

/// Partial card update. `list_id` and `order` are only set by moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub company_name: Option<String>,
    pub role_name: Option<String>,
    pub list_id: Option<Uuid>,
    pub order: Option<f64>,
}

impl CardPatch {
    pub fn placement(list_id: Uuid, order: f64) -> Self {
        Self {
            list_id: Some(list_id),
            order: Some(order),
            ..Default::default()
        }
    }
}
