//! API Request and Response Types
//!
//! Wire shapes for every endpoint. Field names match the JSON the service
//! has always spoken (`postID`, `access_token`), not Rust conventions.

// Signup and login types
mod auth;
pub use auth::*;

// Post types
mod post;
pub use post::*;

use serde::{Deserialize, Serialize};

/// Plain acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
