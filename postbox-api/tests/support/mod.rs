//! Shared harness for the HTTP-level tests.
//!
//! Builds the full router around an in-memory credential store and a
//! manually driven clock, and wraps each endpoint in a small async helper.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use postbox_api::{ApiConfig, AppState, AuthConfig, RouterBuilder, TokenSecret};
use postbox_core::ManualClock;
use postbox_storage::{CredentialStore, InMemoryCredentialStore};
use postbox_test_utils::fixtures::EPOCH_2024;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Router plus the clock that drives token and cache expiry.
pub struct TestServer {
    pub app: Router,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

/// Status, headers and parsed JSON body (Null when the body is not JSON).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_auth(|config| config)
    }

    /// Build a server after adjusting the auth config.
    pub fn with_auth(adjust: impl FnOnce(AuthConfig) -> AuthConfig) -> Self {
        Self::build(adjust, Arc::new(InMemoryCredentialStore::new()))
    }

    /// Build a server around the given credential store.
    pub fn with_credentials(credentials: Arc<dyn CredentialStore>) -> Self {
        Self::build(|config| config, credentials)
    }

    fn build(
        adjust: impl FnOnce(AuthConfig) -> AuthConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let clock = Arc::new(ManualClock::starting_at(EPOCH_2024));
        let secret = TokenSecret::new(TEST_SECRET.to_string()).unwrap();
        let auth_config = adjust(
            AuthConfig::default()
                .with_secret(secret)
                .with_clock(clock.clone()),
        );
        let api_config = ApiConfig {
            posts_cache_ttl: CACHE_TTL,
            ..ApiConfig::default()
        };

        let state = AppState::new(auth_config, &api_config, credentials);
        let app = RouterBuilder::new(state.clone(), api_config)
            .with_production_checks(false)
            .build()
            .unwrap();

        Self { app, clock, state }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(
            Request::post("/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!(
            "username={}&password={}",
            form_encode(username),
            form_encode(password)
        );
        self.send(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    /// Register and log in, returning the bearer token.
    pub async fn register_and_login(&self, email: &str, password: &str) -> String {
        assert_eq!(self.signup(email, password).await.status, StatusCode::OK);
        let login = self.login(email, password).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn add_post(&self, token: &str, text: &str) -> TestResponse {
        let body = serde_json::json!({ "text": text });
        self.send(
            Request::post("/addPost")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_posts(&self, token: &str) -> TestResponse {
        self.send(
            Request::get("/getPosts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete_post(&self, token: &str, post_id: u64) -> TestResponse {
        self.delete_post_query(token, &format!("post_id={}", post_id))
            .await
    }

    /// `DELETE /deletePost` with a raw query string.
    pub async fn delete_post_query(&self, token: &str, query: &str) -> TestResponse {
        self.send(
            Request::delete(format!("/deletePost?{}", query))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// `application/x-www-form-urlencoded` encoding of a single value.
pub fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'*' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// `(postID, text)` pairs of a listing body.
pub fn listing(body: &Value) -> Vec<(u64, String)> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["postID"].as_u64().unwrap(),
                p["text"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}
