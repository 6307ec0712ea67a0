use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, AuthSettings, Claims, PasswordError};
use crate::database::manager::DatabaseError;
use crate::database::models::PublicUser;
use crate::database::store::Store;
use crate::services::error::ServiceError;

pub const DEFAULT_BOARD_NAME: &str = "Job Application Board";

/// Lists every new user starts with, in display order
pub const DEFAULT_LIST_NAMES: [&str; 6] = ["Wishlist", "Applied", "Assessment", "Interview", "Offer", "Closed"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, settings: AuthSettings) -> Self {
        Self { store, settings }
    }

    /// Create the user with a default board and its six lists, all or nothing
    pub async fn register(&self, email: &str, password: &str) -> Result<PublicUser, ServiceError> {
        let password_hash = hash_blocking(password.to_string()).await?;

        let mut tx = self.store.begin().await?;
        let user = tx.create_user(email, &password_hash).await.map_err(|err| match err {
            DatabaseError::UniqueViolation(_) => {
                warn!("Registration rejected, email already taken");
                ServiceError::Conflict("Email already exists.".to_string())
            }
            other => other.into(),
        })?;

        let board = tx.create_board(user.id, DEFAULT_BOARD_NAME).await?;
        for (position, name) in DEFAULT_LIST_NAMES.iter().enumerate() {
            tx.create_list(board.id, name, position as f64).await?;
        }
        tx.commit().await?;

        info!("Registered user {} with board {}", user.id, board.id);
        Ok(user.into())
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ServiceError> {
        let mut tx = self.store.begin().await?;
        let user = tx.find_user_by_email(email).await?;
        tx.commit().await?;

        let Some(user) = user else {
            warn!("Login failed: unknown email");
            return Err(invalid_credentials());
        };

        let valid = verify_blocking(password.to_string(), user.password.clone()).await?;
        if !valid {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(invalid_credentials());
        }

        let claims = Claims::new(user.id, user.email, self.settings.jwt_expiry_hours);
        let access_token = auth::generate_jwt(&claims, &self.settings.jwt_secret)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!("User {} logged in", user.id);
        Ok(AccessToken { access_token })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<PublicUser, ServiceError> {
        let mut tx = self.store.begin().await?;
        let user = tx.find_user(user_id).await?;
        tx.commit().await?;

        user.map(PublicUser::from)
            .ok_or_else(|| ServiceError::Unauthorized("User not found.".to_string()))
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid credentials".to_string())
}

fn password_failure(err: PasswordError) -> ServiceError {
    ServiceError::Internal(err.to_string())
}

// Argon2 is CPU bound, keep it off the async workers
async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(password_failure)
}

async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?
        .map_err(password_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::types::SortDirection;

    fn service() -> (Arc<MemoryStore>, AuthService) {
        let store = Arc::new(MemoryStore::new());
        let settings = AuthSettings {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            password_min_length: 6,
        };
        (store.clone(), AuthService::new(store, settings))
    }

    #[tokio::test]
    async fn register_creates_default_board_and_lists() {
        let (store, service) = service();
        let user = service.register("jane@example.com", "secret1").await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let boards = tx.find_boards_by_user(user.id).await.unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].name, DEFAULT_BOARD_NAME);

        let lists = tx.find_lists_by_board(boards[0].id, SortDirection::Asc).await.unwrap();
        let names: Vec<&str> = lists.iter().map(|l| l.name.as_str()).collect();
        let orders: Vec<f64> = lists.iter().map(|l| l.order).collect();
        assert_eq!(names, DEFAULT_LIST_NAMES.to_vec());
        assert_eq!(orders, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_without_extra_rows() {
        let (store, service) = service();
        let first = service.register("jane@example.com", "secret1").await.unwrap();
        assert!(matches!(
            service.register("jane@example.com", "secret2").await,
            Err(ServiceError::Conflict(_))
        ));

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_boards_by_user(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let (_, service) = service();
        let user = service.register("jane@example.com", "secret1").await.unwrap();

        let token = service.login("jane@example.com", "secret1").await.unwrap();
        let claims = auth::validate_jwt(&token.access_token, "test-secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "jane@example.com");
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let (_, service) = service();
        service.register("jane@example.com", "secret1").await.unwrap();

        let wrong_password = service.login("jane@example.com", "nope").await.unwrap_err();
        let unknown_email = service.login("john@example.com", "secret1").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
        assert_eq!(unknown_email.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn profile_of_missing_user_is_unauthorized() {
        let (_, service) = service();
        assert!(matches!(
            service.profile(Uuid::new_v4()).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
