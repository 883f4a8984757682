//! Fuzz target for bearer token verification
//!
//! Arbitrary strings must come back as a token error, never a panic, and
//! never as an accepted token for this secret.
//!
//! Run with: cargo +nightly fuzz run token_fuzz -- -max_total_time=60

#![no_main]

use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;
use postbox_api::{validate_token, AuthConfig, ErrorCode, TokenSecret};
use postbox_core::FixedClock;

fn config() -> &'static AuthConfig {
    static CONFIG: OnceLock<AuthConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let secret = TokenSecret::new("fuzz-secret-fuzz-secret-fuzz-secret".to_string())
            .expect("non-empty secret");
        AuthConfig::default()
            .with_secret(secret)
            .with_clock(Arc::new(FixedClock(1_704_067_200)))
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(token) = std::str::from_utf8(data) {
        match validate_token(config(), token) {
            Ok(claims) => panic!("forged token accepted for {}", claims.sub),
            Err(err) => assert!(matches!(
                err.code,
                ErrorCode::InvalidToken | ErrorCode::TokenExpired
            )),
        }
    }
});
