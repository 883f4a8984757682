//! Error Types for the Postbox API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with a fixed HTTP status per code.
//! Internal failure details are logged and never returned to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postbox_core::{EntityType, PostboxError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401, 403)
    // ========================================================================
    /// Bad credentials, or a missing, invalid or expired bearer token
    Unauthenticated,

    /// Caller is authenticated but does not own the resource
    Forbidden,

    /// Token is malformed or its signature does not verify
    InvalidToken,

    /// Token is past its expiry
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    /// Identity is already registered
    AlreadyExists,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested post does not exist
    PostNotFound,

    /// Some other entity does not exist
    EntityNotFound,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Storage backend failed
    StorageError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthenticated | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat
            | ErrorCode::AlreadyExists => StatusCode::BAD_REQUEST,

            ErrorCode::PostNotFound | ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::InternalError | ErrorCode::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "Could not validate credentials",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::AlreadyExists => "Already registered",

            ErrorCode::PostNotFound => "Post not found",
            ErrorCode::EntityNotFound => "Entity not found",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Storage operation failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors and the like)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// The one rejection every authentication failure collapses to.
    pub fn unauthenticated() -> Self {
        Self::from_code(ErrorCode::Unauthenticated)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn post_not_found() -> Self {
        Self::from_code(ErrorCode::PostNotFound)
    }

    pub fn entity_not_found(entity_type: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::unauthenticated())
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists {
                entity_type: EntityType::Identity,
                ..
            } => ApiError::already_exists("Email already registered"),
            StorageError::AlreadyExists { entity_type, id } => ApiError::already_exists(format!(
                "{} with id {} already exists",
                entity_type, id
            )),
            StorageError::NotFound {
                entity_type: EntityType::Post,
                ..
            } => ApiError::post_not_found(),
            StorageError::NotFound { entity_type, id } => {
                ApiError::entity_not_found(entity_type, id)
            }
            StorageError::LockPoisoned | StorageError::Backend { .. } => {
                // Log the full error, return a generic one
                tracing::error!(error = %err, "Storage failure");
                ApiError::storage_error("Storage operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::validation_failed(format!("Invalid value for {}: {}", field, reason))
            }
        }
    }
}

impl From<PostboxError> for ApiError {
    fn from(err: PostboxError) -> Self {
        match err {
            PostboxError::Storage(e) => e.into(),
            PostboxError::Validation(e) => e.into(),
            PostboxError::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                ApiError::internal_error(format!("Configuration error: {}", e))
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::AlreadyExists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StorageError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: ApiError = StorageError::identity_exists("a@x.com").into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.message, "Email already registered");

        let err: ApiError = StorageError::post_not_found(7).into();
        assert_eq!(err.code, ErrorCode::PostNotFound);
        assert_eq!(err.message, "Post not found");

        let err: ApiError = StorageError::Backend {
            reason: "disk on fire at /var/lib/postbox".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("/var/lib/postbox"));
    }

    #[test]
    fn test_postbox_error_conversion() {
        let err: ApiError = PostboxError::from(ValidationError::RequiredFieldMissing {
            field: "text".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("text"));
    }

    #[test]
    fn test_api_error_with_details() {
        let details = serde_json::json!({
            "field": "email",
            "constraint": "must be valid email address"
        });

        let err = ApiError::validation_failed("Invalid email").with_details(details.clone());

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details, Some(details));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unauthenticated();
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("UNAUTHENTICATED"));
        assert!(json.contains("Could not validate credentials"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::storage_error("Connection failed");
        let display = format!("{}", err);

        assert!(display.contains("StorageError"));
        assert!(display.contains("Connection failed"));
    }
}
