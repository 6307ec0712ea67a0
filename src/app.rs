use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthSettings;
use crate::config::{AppConfig, PaginationConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::services::{AuthService, BoardService, CardService, ListService};

/// Everything a request handler needs, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthSettings,
    pub pagination: PaginationConfig,
    pub cors_origins: Vec<String>,
    pub accounts: AuthService,
    pub boards: BoardService,
    pub lists: ListService,
    pub cards: CardService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: AuthSettings, pagination: PaginationConfig) -> Self {
        Self {
            accounts: AuthService::new(store.clone(), auth.clone()),
            boards: BoardService::new(store.clone()),
            lists: ListService::new(store.clone()),
            cards: CardService::new(store.clone()),
            store,
            auth,
            pagination,
            cors_origins: Vec::new(),
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        let mut state = Self::new(store, AuthSettings::from(&config.security), config.pagination.clone());
        state.cors_origins = config.security.cors_origins.clone();
        state
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(public::register_post))
        .route("/auth/login", post(public::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{boards, cards, lists, profile};

    Router::new()
        .route("/profile", get(profile::profile_get))
        .route("/boards", get(boards::boards_get).post(boards::board_post))
        .route(
            "/boards/:id",
            get(boards::board_get)
                .patch(boards::board_patch)
                .delete(boards::board_delete),
        )
        .route("/lists", post(lists::list_post))
        .route(
            "/lists/:id",
            get(lists::list_get)
                .patch(lists::list_patch)
                .delete(lists::list_delete),
        )
        .route("/cards", post(cards::card_post))
        .route("/cards/:id", patch(cards::card_patch).delete(cards::card_delete))
        .route("/cards/:id/move", patch(cards::card_move))
        // last layer added runs first: JWT, then the user check
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
}
