//! Validation Traits
//!
//! Common validation patterns extracted from route handlers.

use crate::constants::{MAX_EMAIL_LENGTH, MAX_EMAIL_LOCAL_LENGTH};
use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use postbox_api::validation::ValidateNonEmpty;
///
/// fn signup(password: &str) -> ApiResult<()> {
///     password.validate_non_empty("password")?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating email-shaped identities.
///
/// Accepts `local@domain.tld` with no whitespace, exactly one `@`, and a
/// dot inside the domain that is neither its first nor its last character.
/// The address is capped at 254 bytes and the local part at 64, which also
/// keeps identities inside the LMDB key size limit. Deliverability is not
/// checked.
pub trait ValidateEmail {
    /// # Errors
    /// Returns `ApiError::invalid_format` if the value is not an address.
    fn validate_email(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateEmail for str {
    fn validate_email(&self, field_name: &str) -> ApiResult<()> {
        if is_email(self) {
            Ok(())
        } else {
            Err(ApiError::invalid_format(field_name, "an email address"))
        }
    }
}

impl ValidateEmail for String {
    fn validate_email(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_email(field_name)
    }
}

fn is_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LENGTH || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_EMAIL_LOCAL_LENGTH || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len() && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_validate_non_empty() {
        assert!("hello".validate_non_empty("field").is_ok());
        assert!("".validate_non_empty("field").is_err());
        assert!("   ".validate_non_empty("field").is_err());
        assert!(Some("x".to_string()).validate_non_empty("field").is_ok());
        assert!(None::<String>.validate_non_empty("field").is_err());
    }

    #[test]
    fn test_validate_email_accepts_addresses() {
        for email in ["a@x.com", "first.last@sub.example.org", "k+tag@ab.io"] {
            assert!(email.validate_email("email").is_ok(), "{} rejected", email);
        }
    }

    #[test]
    fn test_validate_email_length_limits() {
        let local_max = format!("{}@x.com", "a".repeat(MAX_EMAIL_LOCAL_LENGTH));
        assert!(local_max.validate_email("email").is_ok());

        let local_over = format!("{}@x.com", "a".repeat(MAX_EMAIL_LOCAL_LENGTH + 1));
        let long_domain = format!("a@{}.com", "d".repeat(MAX_EMAIL_LENGTH));
        let huge = format!("{}@x.com", "a".repeat(600));

        for email in [local_over, long_domain, huge] {
            assert_eq!(
                email.validate_email("email").map_err(|e| e.code),
                Err(ErrorCode::InvalidFormat)
            );
        }

        // Exactly at the total limit is still accepted.
        let domain = format!("{}.com", "d".repeat(MAX_EMAIL_LENGTH - 2 - 4));
        let at_limit = format!("a@{}", domain);
        assert_eq!(at_limit.len(), MAX_EMAIL_LENGTH);
        assert!(at_limit.validate_email("email").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_non_addresses() {
        for email in [
            "",
            "plain",
            "@x.com",
            "a@",
            "a@x",
            "a@.com",
            "a@x.",
            "a@@x.com",
            "a b@x.com",
            "a@x.com ",
        ] {
            let result = email.validate_email("email");
            assert_eq!(
                result.map_err(|e| e.code),
                Err(ErrorCode::InvalidFormat),
                "{:?} accepted",
                email
            );
        }
    }
}
