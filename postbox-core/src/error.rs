//! Error types for Postbox operations

use crate::EntityType;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: EntityType, id: String },

    #[error("Entity already exists: {entity_type} with id {id}")]
    AlreadyExists { entity_type: EntityType, id: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },
}

impl StorageError {
    pub fn identity_not_found(identity: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: EntityType::Identity,
            id: identity.into(),
        }
    }

    pub fn identity_exists(identity: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type: EntityType::Identity,
            id: identity.into(),
        }
    }

    pub fn post_not_found(post_id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity_type: EntityType::Post,
            id: post_id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Postbox errors.
#[derive(Debug, Clone, Error)]
pub enum PostboxError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Postbox operations.
pub type PostboxResult<T> = Result<T, PostboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::post_not_found(42);
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Post"));
        assert!(msg.contains("42"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_storage_error_display_already_exists() {
        let err = StorageError::identity_exists("a@x.com");
        let msg = format!("{}", err);
        assert!(msg.contains("already exists"));
        assert!(msg.contains("a@x.com"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "token_ttl_secs".to_string(),
            value: "-5".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("token_ttl_secs"));
        assert!(msg.contains("-5"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_postbox_error_from_variants() {
        let storage = PostboxError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, PostboxError::Storage(_)));

        let validation = PostboxError::from(ValidationError::RequiredFieldMissing {
            field: "email".to_string(),
        });
        assert!(matches!(validation, PostboxError::Validation(_)));

        let config = PostboxError::from(ConfigError::MissingRequired {
            field: "token_secret".to_string(),
        });
        assert!(matches!(config, PostboxError::Config(_)));
    }
}
