//! Signup and login types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to register a new identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SignupRequest {
    /// Email address used as the identity
    pub email: String,
    /// Secret presented at login
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login form (`application/x-www-form-urlencoded`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginForm {
    /// Email address of the identity
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token issued on login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secrets() {
        let signup = SignupRequest {
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        };
        let login = LoginForm {
            username: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        };
        let token = TokenResponse {
            access_token: "eyJ.secret.sig".to_string(),
            token_type: "bearer".to_string(),
        };

        for debug in [format!("{:?}", signup), format!("{:?}", login), format!("{:?}", token)] {
            assert!(!debug.contains("hunter2"));
            assert!(!debug.contains("eyJ.secret.sig"));
        }
    }
}
