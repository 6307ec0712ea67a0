// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Input is validated before reaching the services.
pub mod auth;
pub mod status;

pub use auth::{login_post, register_post};
pub use status::{health_get, root_get};
