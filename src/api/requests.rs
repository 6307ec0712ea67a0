//! Request bodies and query strings, each with an explicit `validate`.
//!
//! Validation runs in the handler before any service call and reports
//! every offending field at once under `field_errors`.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::database::models::{BoardPatch, CardPatch, ListPatch};
use crate::error::ApiError;

/// JSON body extractor whose rejection uses the API error envelope
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Collects per-field messages while a request is checked
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{field} should not be empty"));
        }
    }

    pub fn non_empty_if_present(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.non_empty(field, value);
        }
    }

    pub fn uuid(&mut self, field: &str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                self.add(field, format!("{field} must be a UUID"));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", Some(self.0)))
        }
    }
}

/// Parse a path id, rejecting anything but a UUID
pub fn parse_id(value: &str) -> Result<Uuid, ApiError> {
    let mut errors = FieldErrors::default();
    let id = errors.uuid("id", value);
    errors.finish()?;
    id.ok_or_else(|| ApiError::bad_request("Invalid id"))
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self, password_min_length: usize) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if !is_valid_email(&self.email) {
            errors.add("email", "email must be an email");
        }
        if self.password.chars().count() < password_min_length {
            errors.add(
                "password",
                format!("password must be longer than or equal to {password_min_length} characters"),
            );
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty("email", &self.email);
        errors.non_empty("password", &self.password);
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoardRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateBoardRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty("name", &self.name);
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
}

impl UpdateBoardRequest {
    pub fn validate(self) -> Result<BoardPatch, ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty_if_present("name", self.name.as_deref());
        errors.finish()?;
        Ok(BoardPatch { name: self.name })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub board_id: String,
}

impl CreateListRequest {
    /// Returns the parsed board id
    pub fn validate(&self) -> Result<Uuid, ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty("name", &self.name);
        let board_id = errors.uuid("boardId", &self.board_id);
        errors.finish()?;
        board_id.ok_or_else(|| ApiError::bad_request("Invalid boardId"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub order: Option<f64>,
}

impl UpdateListRequest {
    pub fn validate(self) -> Result<ListPatch, ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty_if_present("name", self.name.as_deref());
        if matches!(self.order, Some(order) if !order.is_finite()) {
            errors.add("order", "order must be a number");
        }
        errors.finish()?;
        Ok(ListPatch {
            name: self.name,
            order: self.order,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub list_id: String,
}

impl CreateCardRequest {
    /// Returns the parsed list id
    pub fn validate(&self) -> Result<Uuid, ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty("companyName", &self.company_name);
        errors.non_empty("roleName", &self.role_name);
        let list_id = errors.uuid("listId", &self.list_id);
        errors.finish()?;
        list_id.ok_or_else(|| ApiError::bad_request("Invalid listId"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub company_name: Option<String>,
    pub role_name: Option<String>,
}

impl UpdateCardRequest {
    pub fn validate(self) -> Result<CardPatch, ApiError> {
        let mut errors = FieldErrors::default();
        errors.non_empty_if_present("companyName", self.company_name.as_deref());
        errors.non_empty_if_present("roleName", self.role_name.as_deref());
        errors.finish()?;
        Ok(CardPatch {
            company_name: self.company_name,
            role_name: self.role_name,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    #[serde(default)]
    pub new_list_id: String,
    pub new_order: Option<i64>,
}

impl MoveCardRequest {
    /// Returns the destination list and the target index within it
    pub fn validate(&self) -> Result<(Uuid, usize), ApiError> {
        let mut errors = FieldErrors::default();
        let list_id = errors.uuid("newListId", &self.new_list_id);
        let index = match self.new_order {
            Some(order) if order >= 0 => usize::try_from(order).ok(),
            Some(_) => {
                errors.add("newOrder", "newOrder must not be less than 0");
                None
            }
            None => {
                errors.add("newOrder", "newOrder must be an integer number");
                None
            }
        };
        errors.finish()?;
        list_id
            .zip(index)
            .ok_or_else(|| ApiError::bad_request("Invalid move request"))
    }
}

/// `?page=&limit=` kept as raw strings so bad values get a field error
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PaginationQuery {
    /// Returns `(page, limit)` with defaults applied
    pub fn validate(&self, config: &PaginationConfig) -> Result<(u32, u32), ApiError> {
        let mut errors = FieldErrors::default();

        let page = match self.page.as_deref() {
            None => 1,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    errors.add("page", "page must not be less than 1");
                    1
                }
            },
        };

        let limit = match self.limit.as_deref() {
            None => config.default_limit,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(limit) if (1..=config.max_limit).contains(&limit) => limit,
                _ => {
                    errors.add("limit", format!("limit must be between 1 and {}", config.max_limit));
                    config.default_limit
                }
            },
        };

        errors.finish()?;
        Ok((page, limit))
    }
}
