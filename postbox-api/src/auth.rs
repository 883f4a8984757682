//! Token Codec
//!
//! Issues and verifies the signed, time-limited bearer tokens that prove a
//! prior successful login. Tokens are stateless HS256 JWTs carrying the
//! subject identity plus `iat` and `exp`; nothing is stored server side, and
//! a token is never refreshed or revoked.
//!
//! Signature checking is delegated to `jsonwebtoken`. Time checking is not:
//! we read the current time from the injected [`Clock`] so that tests are
//! deterministic and a broken system clock fails loudly instead of panicking.

use crate::constants::{
    DEFAULT_TOKEN_CLOCK_SKEW_SECS, DEFAULT_TOKEN_TTL_SECS, INSECURE_DEFAULT_SECRET,
    MIN_TOKEN_SECRET_LENGTH,
};
use crate::error::{ApiError, ApiResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use postbox_core::{Clock, ConfigError, Identity, PostboxError, SystemClock};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TOKEN SECRET (TYPE-SAFE)
// ============================================================================

/// Server-held signing secret that never prints.
#[derive(Clone)]
pub struct TokenSecret(SecretString);

impl TokenSecret {
    /// Create a new token secret.
    ///
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, PostboxError> {
        if secret.is_empty() {
            return Err(PostboxError::Config(ConfigError::MissingRequired {
                field: "token_secret".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Check if the secret is the insecure development default.
    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_token_secret(secret_str: String) -> TokenSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match TokenSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => TokenSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Token issuance and verification settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// Signing secret for issued tokens
    pub token_secret: TokenSecret,

    /// Signing algorithm (HS256)
    pub token_algorithm: Algorithm,

    /// Lifetime of issued tokens in seconds (default: 1800)
    pub token_ttl_secs: i64,

    /// Seconds past `exp` a token is still accepted (default: 0)
    pub token_clock_skew_secs: i64,

    /// Reject tokens whose subject is no longer in the credential store
    pub require_registered_subject: bool,

    /// Clock for issuing and validating tokens (injected for testing)
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &self.token_secret)
            .field("token_algorithm", &self.token_algorithm)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("token_clock_skew_secs", &self.token_clock_skew_secs)
            .field("require_registered_subject", &self.require_registered_subject)
            .field("clock", &"<Clock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: build_token_secret(INSECURE_DEFAULT_SECRET.to_string()),
            token_algorithm: Algorithm::HS256,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            token_clock_skew_secs: DEFAULT_TOKEN_CLOCK_SKEW_SECS,
            require_registered_subject: false,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `POSTBOX_TOKEN_SECRET`: token signing secret
    /// - `POSTBOX_TOKEN_TTL_SECS`: token lifetime (default: 1800)
    /// - `POSTBOX_TOKEN_CLOCK_SKEW_SECS`: grace period past expiry (default: 0)
    /// - `POSTBOX_REQUIRE_REGISTERED_SUBJECT`: re-check the subject on every request (default: false)
    pub fn from_env() -> Self {
        let secret_str = std::env::var("POSTBOX_TOKEN_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            token_secret: build_token_secret(secret_str),
            token_algorithm: Algorithm::HS256,
            token_ttl_secs: std::env::var("POSTBOX_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ttl: &i64| *ttl > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            token_clock_skew_secs: std::env::var("POSTBOX_TOKEN_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|skew: &i64| *skew >= 0)
                .unwrap_or(DEFAULT_TOKEN_CLOCK_SKEW_SECS),
            require_registered_subject: std::env::var("POSTBOX_REQUIRE_REGISTERED_SUBJECT")
                .ok()
                .and_then(|s| s.to_lowercase().parse().ok())
                .unwrap_or(false),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the signing secret.
    pub fn with_secret(mut self, secret: TokenSecret) -> Self {
        self.token_secret = secret;
        self
    }

    /// Validate the configuration for the current environment.
    ///
    /// Reads `POSTBOX_ENVIRONMENT`. In production the insecure default and
    /// short secrets are rejected; in development they only log a warning.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        self.validate_secret(crate::config::is_production_environment())
    }

    pub(crate) fn validate_secret(&self, is_production: bool) -> ApiResult<()> {
        if self.token_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start server in production with insecure token secret. \
                     Set POSTBOX_TOKEN_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "SECURITY WARNING: Using insecure default token secret. \
                 Set POSTBOX_TOKEN_SECRET to a secure random value (minimum 32 characters)."
            );
        }

        if self.token_secret.len() < MIN_TOKEN_SECRET_LENGTH {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "Token secret is too short for production use ({} chars). \
                     It must be at least {} characters long.",
                    self.token_secret.len(),
                    MIN_TOKEN_SECRET_LENGTH
                )));
            }
            tracing::warn!(
                length = self.token_secret.len(),
                "SECURITY WARNING: Token secret is short. Use at least 32 characters in production."
            );
        }

        Ok(())
    }
}

// ============================================================================
// TOKEN CLAIMS
// ============================================================================

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the identity that logged in)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `subject` expiring `ttl_secs` after the clock's now.
    pub fn new(subject: &Identity, ttl_secs: i64, clock: &dyn Clock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: subject.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }

    /// A token is expired once `now` reaches `exp + skew_secs`.
    pub fn is_expired_at(&self, now: i64, skew_secs: i64) -> bool {
        now >= self.exp.saturating_add(skew_secs)
    }

    pub fn subject(&self) -> Identity {
        Identity::new(self.sub.clone())
    }
}

/// Verified caller attached to a request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject of the presented token
    pub identity: Identity,

    /// Expiry of the presented token (Unix timestamp)
    pub expires_at: i64,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            identity: Identity::new(claims.sub),
            expires_at: claims.exp,
        }
    }
}

// ============================================================================
// ISSUE / VERIFY
// ============================================================================

/// Issue a token for `subject` with the configured lifetime.
pub fn generate_token(config: &AuthConfig, subject: &Identity) -> ApiResult<String> {
    issue(config, subject, config.token_ttl_secs)
}

/// Issue a token for `subject` with an explicit lifetime.
pub fn generate_token_with_ttl(
    config: &AuthConfig,
    subject: &Identity,
    ttl: Duration,
) -> ApiResult<String> {
    let ttl_secs = i64::try_from(ttl.as_secs())
        .map_err(|_| ApiError::invalid_input("Token lifetime is too large"))?;
    issue(config, subject, ttl_secs)
}

fn issue(config: &AuthConfig, subject: &Identity, ttl_secs: i64) -> ApiResult<String> {
    let claims = Claims::new(subject, ttl_secs, &*config.clock);
    let encoding_key = EncodingKey::from_secret(config.token_secret.expose().as_bytes());
    let header = Header::new(config.token_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Verify a token and return its claims.
///
/// - `InvalidToken` when the token is malformed, signed with another secret
///   or another algorithm, or lacks `exp`.
/// - `TokenExpired` when `now >= exp + token_clock_skew_secs`.
/// - `InternalError` when the clock reports a pre-epoch time.
pub fn validate_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.token_secret.expose().as_bytes());

    // Signature only; time is checked below against our own clock.
    let mut validation = Validation::new(config.token_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                ApiError::invalid_token("Token algorithm is not accepted")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();

    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error(
            "Server time configuration error - please contact support",
        ));
    }

    if claims.is_expired_at(now, config.token_clock_skew_secs) {
        return Err(ApiError::token_expired());
    }

    Ok(claims)
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(header_value: &str) -> ApiResult<&str> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ApiError::invalid_token("Authorization header must use Bearer scheme"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::invalid_token(
            "Authorization header must use Bearer scheme",
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::invalid_token("Bearer token is empty"));
    }
    Ok(token)
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use postbox_core::FixedClock;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.previous.as_deref() {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    fn secret(value: &str) -> ApiResult<TokenSecret> {
        TokenSecret::new(value.to_string()).map_err(ApiError::from)
    }

    fn test_config() -> ApiResult<AuthConfig> {
        Ok(AuthConfig::default()
            .with_secret(secret("test_secret")?)
            .with_clock(Arc::new(test_clocks::valid())))
    }

    fn at(config: &AuthConfig, epoch_secs: i64) -> AuthConfig {
        config.clone().with_clock(Arc::new(FixedClock(epoch_secs)))
    }

    #[test]
    fn test_token_round_trip() -> ApiResult<()> {
        let config = test_config()?;
        let subject = Identity::new("a@x.com");

        let token = generate_token(&config, &subject)?;
        let claims = validate_token(&config, &token)?;

        assert_eq!(claims.subject(), subject);
        assert_eq!(claims.iat, test_clocks::VALID_EPOCH);
        assert_eq!(claims.exp, test_clocks::VALID_EPOCH + DEFAULT_TOKEN_TTL_SECS);
        Ok(())
    }

    #[test]
    fn test_expiry_boundary() -> ApiResult<()> {
        let config = test_config()?;
        let token = generate_token(&config, &Identity::new("a@x.com"))?;
        let exp = test_clocks::VALID_EPOCH + DEFAULT_TOKEN_TTL_SECS;

        assert!(validate_token(&at(&config, exp - 1), &token).is_ok());

        let err = validate_token(&at(&config, exp), &token)
            .err()
            .ok_or_else(|| ApiError::internal_error("token at exp should be rejected"))?;
        assert_eq!(err.code, ErrorCode::TokenExpired);
        Ok(())
    }

    #[test]
    fn test_clock_skew_extends_acceptance() -> ApiResult<()> {
        let mut config = test_config()?;
        config.token_clock_skew_secs = 5;
        let token = generate_token_with_ttl(&config, &Identity::new("a@x.com"), Duration::from_secs(10))?;
        let exp = test_clocks::VALID_EPOCH + 10;

        assert!(validate_token(&at(&config, exp + 4), &token).is_ok());
        let result = validate_token(&at(&config, exp + 5), &token);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::TokenExpired));
        Ok(())
    }

    #[test]
    fn test_wrong_secret_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let token = generate_token(&config, &Identity::new("a@x.com"))?;

        let other = config.clone().with_secret(secret("another_secret")?);
        let result = validate_token(&other, &token);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InvalidToken));
        Ok(())
    }

    #[test]
    fn test_spliced_payload_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let alice = generate_token(&config, &Identity::new("alice@x.com"))?;
        let mallory = generate_token(&config, &Identity::new("mallory@x.com"))?;

        let a: Vec<&str> = alice.split('.').collect();
        let m: Vec<&str> = mallory.split('.').collect();
        let forged = format!("{}.{}.{}", m[0], a[1], m[2]);

        let result = validate_token(&config, &forged);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InvalidToken));
        Ok(())
    }

    #[test]
    fn test_other_algorithm_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let claims = Claims::new(&Identity::new("a@x.com"), 60, &test_clocks::valid());
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

        let result = validate_token(&config, &token);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InvalidToken));
        Ok(())
    }

    #[test]
    fn test_garbage_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        for token in ["", "not-a-token", "a.b.c", "invalid.jwt.token"] {
            let result = validate_token(&config, token);
            assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InvalidToken));
        }
        Ok(())
    }

    #[test]
    fn test_pre_epoch_clock_fails_loudly() -> ApiResult<()> {
        let config = test_config()?;
        let token = generate_token(&config, &Identity::new("a@x.com"))?;

        let broken = config.with_clock(Arc::new(test_clocks::pre_epoch()));
        let result = validate_token(&broken, &token);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InternalError));
        Ok(())
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi").ok(), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("bearer abc").ok(), Some("abc"));
        assert!(extract_bearer("Basic dXNlcjpwYXNz").is_err());
        assert!(extract_bearer("Bearer ").is_err());
        assert!(extract_bearer("abc.def.ghi").is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() -> ApiResult<()> {
        let config = AuthConfig::default().with_secret(secret("super-secret-value")?);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
        Ok(())
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(TokenSecret::new(String::new()).is_err());
    }

    #[test]
    fn test_production_rejects_insecure_default() {
        let config = AuthConfig::default();
        let result = config.validate_secret(true);
        assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::InvalidInput));
        assert!(config.validate_secret(false).is_ok());
    }

    #[test]
    fn test_production_rejects_short_secret() -> ApiResult<()> {
        let config = AuthConfig::default().with_secret(secret("short")?);
        assert!(config.validate_secret(true).is_err());
        assert!(config.validate_secret(false).is_ok());
        Ok(())
    }

    #[test]
    fn test_production_allows_secure_secret() -> ApiResult<()> {
        let config = AuthConfig::default().with_secret(secret(
            "this-is-a-very-secure-secret-that-is-at-least-32-characters-long",
        )?);
        config.validate_secret(true)
    }

    #[test]
    fn test_from_env() {
        let _env_lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _secret = EnvVarGuard::set("POSTBOX_TOKEN_SECRET", Some("from-env-secret"));
        let _ttl = EnvVarGuard::set("POSTBOX_TOKEN_TTL_SECS", Some("60"));
        let _skew = EnvVarGuard::set("POSTBOX_TOKEN_CLOCK_SKEW_SECS", None);
        let _subject = EnvVarGuard::set("POSTBOX_REQUIRE_REGISTERED_SUBJECT", Some("TRUE"));

        let config = AuthConfig::from_env();
        assert_eq!(config.token_secret.expose(), "from-env-secret");
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.token_clock_skew_secs, 0);
        assert!(config.require_registered_subject);
    }

    #[test]
    fn test_from_env_ignores_bad_values() {
        let _env_lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _secret = EnvVarGuard::set("POSTBOX_TOKEN_SECRET", Some("   "));
        let _ttl = EnvVarGuard::set("POSTBOX_TOKEN_TTL_SECS", Some("-5"));
        let _skew = EnvVarGuard::set("POSTBOX_TOKEN_CLOCK_SKEW_SECS", Some("soon"));
        let _subject = EnvVarGuard::set("POSTBOX_REQUIRE_REGISTERED_SUBJECT", None);

        let config = AuthConfig::from_env();
        assert!(config.token_secret.is_insecure_default());
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.token_clock_skew_secs, DEFAULT_TOKEN_CLOCK_SKEW_SECS);
        assert!(!config.require_registered_subject);
    }
}
