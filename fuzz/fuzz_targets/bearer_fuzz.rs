//! Fuzz target for `Authorization` header parsing
//!
//! Run with: cargo +nightly fuzz run bearer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use postbox_api::extract_bearer;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = std::str::from_utf8(data) {
        if let Ok(token) = extract_bearer(header) {
            assert!(!token.is_empty());
            assert!(header.trim_end().ends_with(token));
        }
    }
});
