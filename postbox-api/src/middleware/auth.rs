//! Axum Middleware for Bearer Authentication
//!
//! This module provides Axum middleware that:
//! - Reads `Authorization: Bearer <token>`
//! - Verifies the token with the token codec
//! - Optionally re-checks that the subject is still registered
//! - Injects AuthContext into request extensions
//! - Returns 401 for every authentication failure
//!
//! Codec-level failures (`INVALID_TOKEN`, `TOKEN_EXPIRED`) are logged at
//! debug and collapsed to a single `UNAUTHENTICATED` response, so clients
//! cannot tell a forged token from an expired one.

use crate::auth::{extract_bearer, validate_token, AuthConfig, AuthContext};
use crate::error::{ApiError, ApiResult, ErrorCode};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use postbox_storage::CredentialStore;
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
///
/// This is passed to the middleware via Axum's State extractor.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    /// Authentication configuration
    pub auth_config: Arc<AuthConfig>,

    /// Credential store, consulted only when `require_registered_subject` is set
    pub credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for AuthMiddlewareState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMiddlewareState")
            .field("auth_config", &self.auth_config)
            .field("credentials", &"<CredentialStore>")
            .finish()
    }
}

impl AuthMiddlewareState {
    pub fn new(auth_config: Arc<AuthConfig>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth_config,
            credentials,
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Resolve the caller from an optional `Authorization` header value.
///
/// Returns the codec's own error; [`auth_middleware`] collapses it.
pub async fn resolve_caller(
    state: &AuthMiddlewareState,
    auth_header: Option<&str>,
) -> ApiResult<AuthContext> {
    let header_value = auth_header
        .ok_or_else(|| ApiError::invalid_token("Authorization header is missing"))?;
    let token = extract_bearer(header_value)?;
    let claims = validate_token(&state.auth_config, token)?;
    let context = AuthContext::from(claims);

    if state.auth_config.require_registered_subject
        && !state.credentials.contains(&context.identity).await?
    {
        return Err(ApiError::invalid_token("Token subject is not registered"));
    }

    Ok(context)
}

/// Axum middleware for bearer authentication.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use postbox_api::middleware::{auth_middleware, AuthMiddlewareState};
///
/// let auth_state = AuthMiddlewareState::new(auth_config, credentials);
///
/// let app = Router::new()
///     .route("/getPosts", axum::routing::get(|| async { "OK" }))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let auth_context = match resolve_caller(&state, auth_header).await {
        Ok(context) => context,
        Err(e) if is_authentication_failure(e.code) => {
            tracing::debug!(code = %e.code, reason = %e.message, "Rejected bearer token");
            return Err(AuthMiddlewareError(ApiError::unauthenticated()));
        }
        // Storage failures during the subject re-check stay 500s.
        Err(e) => return Err(AuthMiddlewareError(e)),
    };

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

fn is_authentication_failure(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::Unauthenticated | ErrorCode::InvalidToken | ErrorCode::TokenExpired
    )
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware that implements IntoResponse.
///
/// 401 responses carry `WWW-Authenticate: Bearer`.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        if response.status() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the authenticated caller.
///
/// The `auth_middleware` must be applied to the route for this extractor to
/// work. Without it the extractor returns a 500 Internal Server Error.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "AuthContext not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
