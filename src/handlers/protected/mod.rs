// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Middleware: jwt_auth_middleware -> validate_user_middleware
// Every handler receives the caller as `Extension<AuthUser>` and passes
// its id explicitly into the service call.
pub mod boards;
pub mod cards;
pub mod lists;
pub mod profile;
