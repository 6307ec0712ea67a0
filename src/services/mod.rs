pub mod auth_service;
pub mod board_service;
pub mod card_service;
pub mod error;
pub mod list_service;
pub mod ordering;
pub mod ownership;

pub use auth_service::{AccessToken, AuthService};
pub use board_service::BoardService;
pub use card_service::CardService;
pub use error::ServiceError;
pub use list_service::{ListPage, ListService};
