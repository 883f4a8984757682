//! Authenticator
//!
//! Checks a presented identity and secret against the credential store.
//! Unknown identities and wrong secrets are indistinguishable to the caller.

use crate::error::{ApiError, ApiResult, ErrorCode};
use postbox_core::Identity;
use postbox_storage::CredentialStore;

/// Message returned for every failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect email or password";

fn login_failed() -> ApiError {
    ApiError::new(ErrorCode::Unauthenticated, LOGIN_FAILED_MESSAGE)
}

/// Verify `secret` for `identity`.
///
/// Returns the identity on success. Has no side effects; issuing a token is
/// the caller's job.
pub async fn authenticate(
    store: &dyn CredentialStore,
    identity: &Identity,
    secret: &str,
) -> ApiResult<Identity> {
    let record = match store.lookup(identity).await {
        Ok(record) => record,
        Err(e) if e.is_not_found() => {
            tracing::debug!(identity = %identity, "Login for unknown identity");
            return Err(login_failed());
        }
        Err(e) => {
            tracing::error!(identity = %identity, error = %e, "Credential lookup failed");
            return Err(ApiError::internal_error("Credential lookup failed"));
        }
    };

    if !record.secret_matches(secret) {
        tracing::debug!(identity = %identity, "Login with wrong secret");
        return Err(login_failed());
    }

    Ok(record.identity)
}
