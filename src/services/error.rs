use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Failure taxonomy of the board/list/card core
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// The entity exists but the acting user does not own it
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}
