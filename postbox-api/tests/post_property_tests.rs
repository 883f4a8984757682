//! Property-Based Tests for Post Ownership and Token Handling
//!
//! - Every identity lists exactly the posts it created, in id order.
//! - Ids are strictly increasing across all identities.
//! - A token only authenticates the identity it was issued for.
//! - A second signup for an identity never replaces the first secret.

mod support;

use std::collections::HashMap;

use axum::http::StatusCode;
use postbox_api::auth::{generate_token, validate_token};
use postbox_test_utils::generators::{arb_identity_pair, arb_post_script, arb_secret};
use proptest::prelude::*;
use support::{listing, TestServer, CACHE_TTL};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Listings are scoped to the caller and ordered by id.
    #[test]
    fn prop_listing_is_owner_scoped(
        (first, second) in arb_identity_pair(),
        script in arb_post_script(2, 12),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = TestServer::new();
            let identities = [first.as_str(), second.as_str()];
            let mut tokens = Vec::new();
            for identity in identities {
                tokens.push(server.register_and_login(identity, "pw").await);
            }

            let mut expected: HashMap<usize, Vec<(u64, String)>> = HashMap::new();
            let mut last_id = 0;
            for (author, text) in &script {
                let created = server.add_post(&tokens[*author], text).await;
                prop_assert_eq!(created.status, StatusCode::OK);

                let id = created.body["postID"].as_u64().unwrap();
                prop_assert!(id > last_id);
                last_id = id;
                expected.entry(*author).or_default().push((id, text.clone()));
            }

            for (author, token) in tokens.iter().enumerate() {
                let posts = server.get_posts(token).await;
                prop_assert_eq!(posts.status, StatusCode::OK);
                prop_assert_eq!(
                    listing(&posts.body),
                    expected.remove(&author).unwrap_or_default()
                );
            }
            Ok(())
        })?;
    }

    /// Deletes by a non-author never change the author's listing.
    #[test]
    fn prop_foreign_delete_is_refused(
        (owner, intruder) in arb_identity_pair(),
        count in 1usize..6,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = TestServer::new();
            let owner_token = server.register_and_login(owner.as_str(), "pw").await;
            let intruder_token = server.register_and_login(intruder.as_str(), "pw").await;

            let mut ids = Vec::new();
            for i in 0..count {
                let created = server.add_post(&owner_token, &format!("post {}", i)).await;
                ids.push(created.body["postID"].as_u64().unwrap());
            }

            for id in &ids {
                let refused = server.delete_post(&intruder_token, *id).await;
                prop_assert_eq!(refused.status, StatusCode::FORBIDDEN);
            }

            server.clock.advance(CACHE_TTL);
            let posts = server.get_posts(&owner_token).await;
            let listed: Vec<u64> = listing(&posts.body).into_iter().map(|(id, _)| id).collect();
            prop_assert_eq!(listed, ids);
            Ok(())
        })?;
    }

    /// A signed token names exactly the identity it was issued for.
    #[test]
    fn prop_token_round_trip((first, second) in arb_identity_pair()) {
        let server = TestServer::new();
        let config = &server.state.auth_config;

        let token = generate_token(config, &first).unwrap();
        let claims = validate_token(config, &token).unwrap();
        prop_assert_eq!(claims.subject(), first.clone());
        prop_assert_ne!(claims.subject(), second.clone());
    }

    /// A second signup never replaces the original secret.
    #[test]
    fn prop_duplicate_signup_keeps_first_secret(
        (identity, _) in arb_identity_pair(),
        original in arb_secret(),
        replacement in arb_secret(),
    ) {
        prop_assume!(original != replacement);

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = TestServer::new();
            prop_assert_eq!(server.signup(identity.as_str(), &original).await.status, StatusCode::OK);

            let again = server.signup(identity.as_str(), &replacement).await;
            prop_assert_eq!(again.status, StatusCode::BAD_REQUEST);
            prop_assert_eq!(again.body["code"].as_str(), Some("ALREADY_EXISTS"));

            prop_assert_eq!(server.login(identity.as_str(), &original).await.status, StatusCode::OK);
            prop_assert_eq!(
                server.login(identity.as_str(), &replacement).await.status,
                StatusCode::UNAUTHORIZED
            );
            Ok(())
        })?;
    }
}
