//! Signup and Login Routes
//!
//! Public endpoints. Signup stores a credential record; login checks one
//! and issues a bearer token.

use axum::{extract::State, response::IntoResponse, routing::post, Form, Json, Router};
use postbox_core::{Identity, IdentityRecord};
use postbox_storage::CredentialStore;
use std::sync::Arc;

use crate::{
    auth::{generate_token, AuthConfig},
    authenticator::authenticate,
    constants::BEARER_TOKEN_TYPE,
    error::{ApiError, ApiResult},
    state::AppState,
    types::{LoginForm, MessageResponse, SignupRequest, TokenResponse},
    validation::{ValidateEmail, ValidateNonEmpty},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /signup - Register a new identity
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Identity registered", body = MessageResponse),
        (status = 400, description = "Email already registered or invalid input", body = ApiError),
    ),
)]
pub async fn signup(
    State(credentials): State<Arc<dyn CredentialStore>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    req.email.validate_email("email")?;
    req.password.validate_non_empty("password")?;

    credentials
        .insert(IdentityRecord::new(req.email.as_str(), req.password))
        .await?;

    tracing::info!(identity = %req.email, "Identity registered");
    Ok(Json(MessageResponse::new("User successfully registered")))
}

/// POST /login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password", body = ApiError),
    ),
)]
pub async fn login(
    State(auth_config): State<Arc<AuthConfig>>,
    State(credentials): State<Arc<dyn CredentialStore>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<impl IntoResponse> {
    let identity = Identity::new(form.username);
    let identity = authenticate(credentials.as_ref(), &identity, &form.password).await?;
    let access_token = generate_token(&auth_config, &identity)?;

    tracing::info!(identity = %identity, "Token issued");
    Ok(Json(TokenResponse {
        access_token,
        token_type: BEARER_TOKEN_TYPE.to_string(),
    }))
}

/// Create the signup/login router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use postbox_storage::InMemoryCredentialStore;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState::new(
            AuthConfig::default(),
            &ApiConfig::default(),
            Arc::new(InMemoryCredentialStore::new()),
        );
        create_router().with_state(state)
    }

    fn signup_request(email: &str, password: &str) -> Request<Body> {
        let body = serde_json::json!({ "email": email, "password": password });
        Request::builder()
            .method("POST")
            .uri("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_duplicate() {
        let app = test_app();

        let response = app.clone().oneshot(signup_request("a@x.com", "p1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json(response).await,
            serde_json::json!({ "message": "User successfully registered" })
        );

        let response = app.oneshot(signup_request("a@x.com", "other")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json(response).await;
        assert_eq!(body["code"], "ALREADY_EXISTS");
        assert_eq!(body["message"], "Email already registered");
    }

    #[tokio::test]
    async fn test_signup_rejects_non_email() {
        let response = test_app().oneshot(signup_request("not-an-email", "p1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["code"], "INVALID_FORMAT");
    }

    #[tokio::test]
    async fn test_login_issues_bearer_token() {
        let app = test_app();
        app.clone().oneshot(signup_request("a@x.com", "p1")).await.unwrap();

        let response = app.oneshot(login_request("a@x.com", "p1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let app = test_app();
        app.clone().oneshot(signup_request("a@x.com", "p1")).await.unwrap();

        let wrong = app.clone().oneshot(login_request("a@x.com", "nope")).await.unwrap();
        let unknown = app.oneshot(login_request("b@x.com", "p1")).await.unwrap();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let wrong = json(wrong).await;
        assert_eq!(wrong, json(unknown).await);
        assert_eq!(wrong["message"], "Incorrect email or password");
    }
}
