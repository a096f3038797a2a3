//! Shared fixtures for the end-to-end suites: fake-data factories and an
//! in-process application wired exactly like the server binary, only on the
//! memory backend.

pub mod factories;

use std::sync::Arc;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use domains::Requester;
use services::{Login, Ports, Services};
use storage_adapters::MemoryStore;

use crate::factories::UserFactory;

pub const JWT_SECRET: &[u8] = b"integration-secret-integration-s";

/// A signed-up user, usable both through HTTP and directly on services.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub requester: Requester,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(Ports::from_store(
            store.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(JwtTokenService::new(JWT_SECRET, Duration::hours(1))),
        ));
        let state = AppState::new(services);
        Self {
            router: router(state.clone()),
            state,
            store,
        }
    }

    pub fn services(&self) -> &Services {
        &self.state.services
    }

    pub async fn user(&self) -> TestUser {
        let signup = UserFactory::signup();
        let username = signup.username.clone();
        let user = self
            .services()
            .accounts
            .signup(signup)
            .await
            .expect("signup failed");
        let token = self
            .services()
            .accounts
            .login(Login {
                username: username.clone(),
                password: UserFactory::PASSWORD.to_string(),
            })
            .await
            .expect("login failed");
        TestUser {
            requester: Requester {
                id: user.id,
                username,
            },
            token: token.access_token,
        }
    }

    /// Sends one request through the full router. Empty bodies come back
    /// as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, "testserver");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    pub async fn get(&self, user: &TestUser, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, user: &TestUser, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&user.token), Some(body))
            .await
    }

    pub async fn patch(&self, user: &TestUser, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(&user.token), Some(body))
            .await
    }

    pub async fn delete(&self, user: &TestUser, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&user.token), None)
            .await
    }
}

/// Titles of a plain (unpaginated) list response, in order.
pub fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
