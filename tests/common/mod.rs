#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use job_tracker_api::app::{app, AppState};
use job_tracker_api::auth::AuthSettings;
use job_tracker_api::config::PaginationConfig;
use job_tracker_api::database::MemoryStore;

pub const JWT_SECRET: &str = "integration-test-secret";

/// The full router over a fresh in-memory store
pub struct TestServer {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> String {
        self.body["data"]["id"].as_str().unwrap_or_default().to_string()
    }
}

impl TestServer {
    pub fn new() -> Self {
        let settings = AuthSettings {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            password_min_length: 6,
        };
        let pagination = PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), settings, pagination);
        Self { router: app(state) }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register and log in, returning the access token
    pub async fn signup(&self, email: &str) -> Result<String> {
        let credentials = json!({ "email": email, "password": "password123" });

        let registered = self
            .request(Method::POST, "/auth/register", None, Some(credentials.clone()))
            .await?;
        anyhow::ensure!(registered.status == StatusCode::CREATED, "register failed: {:?}", registered.body);

        let login = self.request(Method::POST, "/auth/login", None, Some(credentials)).await?;
        anyhow::ensure!(login.status == StatusCode::OK, "login failed: {:?}", login.body);

        login.body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    /// The user's default board, fully nested
    pub async fn default_board(&self, token: &str) -> Result<Value> {
        let boards = self.get("/boards", token).await?;
        let board_id = boards.body["data"][0]["id"].as_str().context("no board")?.to_string();
        let board = self.get(&format!("/boards/{board_id}"), token).await?;
        Ok(board.body["data"].clone())
    }

    /// Id of the default list with the given name
    pub async fn list_id(&self, token: &str, name: &str) -> Result<String> {
        let board = self.default_board(token).await?;
        board["lists"]
            .as_array()
            .and_then(|lists| lists.iter().find(|list| list["name"] == name))
            .and_then(|list| list["id"].as_str())
            .map(str::to_string)
            .with_context(|| format!("no list named {name}"))
    }

    pub async fn create_card(&self, token: &str, list_id: &str, company: &str) -> Result<String> {
        let created = self
            .post(
                "/cards",
                token,
                json!({ "companyName": company, "roleName": "Engineer", "listId": list_id }),
            )
            .await?;
        anyhow::ensure!(created.status == StatusCode::CREATED, "create card failed: {:?}", created.body);
        Ok(created.id())
    }

    /// Company names of a list's cards in display order
    pub async fn companies(&self, token: &str, list_id: &str) -> Result<Vec<String>> {
        let list = self.get(&format!("/lists/{list_id}?limit=100"), token).await?;
        Ok(list.body["data"]["cards"]
            .as_array()
            .context("no cards array")?
            .iter()
            .filter_map(|card| card["companyName"].as_str().map(str::to_string))
            .collect())
    }
}
