//! Unit tests for the session manager

use std::sync::Arc;

use chrono::Duration;

use super::{harness, principal};
use crate::domain::entities::RevocationKey;
use crate::errors::TokenError;
use crate::repositories::revocation::RevocationStore;

#[tokio::test]
async fn test_login_registers_both_jtis() {
    let h = harness();

    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    assert!(h.store.contains(&RevocationKey::access(pair.access_jti.clone())).await);
    assert!(h.store.contains(&RevocationKey::refresh(pair.refresh_jti.clone())).await);
    assert_eq!(h.store.len().await, 2);
}

#[tokio::test]
async fn test_login_then_authenticate() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    let identity = h.sessions.authenticate(&pair.access_token).await.unwrap();

    assert_eq!(identity.principal_id, 42);
    assert_eq!(identity.email, "a@b.com");
    assert_eq!(identity.access_jti, pair.access_jti);
}

#[tokio::test]
async fn test_login_persist_failure() {
    let h = harness();
    h.store.set_available(false);

    let result = h.sessions.login(&principal(42, "a@b.com")).await;

    assert!(matches!(result, Err(TokenError::PersistFailed { .. })));
}

#[tokio::test]
async fn test_missing_entry_is_revoked() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.store.delete(&pair.access_key()).await.unwrap();

    assert_eq!(
        h.sessions.authenticate(&pair.access_token).await,
        Err(TokenError::RevokedOrUnknownToken)
    );
}

#[tokio::test]
async fn test_entry_owned_by_other_principal_is_rejected() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.store
        .put(&pair.access_key(), 7, std::time::Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        h.sessions.authenticate(&pair.access_token).await,
        Err(TokenError::RevokedOrUnknownToken)
    );
}

#[tokio::test]
async fn test_authenticate_expired_access() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.clock.advance(Duration::minutes(15));

    assert_eq!(
        h.sessions.authenticate(&pair.access_token).await,
        Err(TokenError::ExpiredToken)
    );
}

#[tokio::test]
async fn test_authenticate_store_outage_is_not_unauthorized() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    h.store.set_available(false);

    let result = h.sessions.authenticate(&pair.access_token).await;

    assert!(matches!(result, Err(TokenError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_rotation_replaces_refresh_entry() {
    let h = harness();
    let first = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.clock.advance(Duration::minutes(16));
    let rotation = h.sessions.rotate(&first.refresh_token).await.unwrap();

    assert_eq!(rotation.principal_id, 42);
    assert_eq!(rotation.email, "a@b.com");
    assert!(!h.store.contains(&first.refresh_key()).await);
    assert!(h.store.contains(&rotation.pair.refresh_key()).await);
    assert!(h.store.contains(&rotation.pair.access_key()).await);

    let identity = h.sessions.authenticate(&rotation.pair.access_token).await.unwrap();
    assert_eq!(identity.principal_id, 42);
}

#[tokio::test]
async fn test_refresh_token_rotates_exactly_once() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    assert!(h.sessions.rotate(&pair.refresh_token).await.is_ok());

    // Signature and expiry are still fine, but the entry is gone
    assert_eq!(
        h.sessions.rotate(&pair.refresh_token).await.map(|r| r.principal_id),
        Err(TokenError::RevokedOrUnknownToken)
    );
}

#[tokio::test]
async fn test_concurrent_rotations_yield_one_pair() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    let sessions = Arc::clone(&h.sessions);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sessions = Arc::clone(&sessions);
            let token = pair.refresh_token.clone();
            tokio::spawn(async move { sessions.rotate(&token).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e, TokenError::RevokedOrUnknownToken),
        }
    }

    assert_eq!(successes, 1);
    // The login's access entry plus exactly one new pair
    assert_eq!(h.store.len().await, 3);
}

#[tokio::test]
async fn test_rotate_rejects_access_token() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    assert_eq!(
        h.sessions.rotate(&pair.access_token).await.map(|r| r.principal_id),
        Err(TokenError::InvalidSignature)
    );
    assert!(h.store.contains(&pair.refresh_key()).await);
}

#[tokio::test]
async fn test_rotate_expired_refresh() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.clock.advance(Duration::days(7));

    assert_eq!(
        h.sessions.rotate(&pair.refresh_token).await.map(|r| r.principal_id),
        Err(TokenError::ExpiredToken)
    );
}

#[tokio::test]
async fn test_rotate_for_other_principal_keeps_entry() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    let result = h.sessions.rotate_for(&pair.refresh_token, Some(7)).await;

    assert_eq!(
        result.map(|r| r.principal_id),
        Err(TokenError::RevokedOrUnknownToken)
    );
    assert!(h.store.contains(&pair.refresh_key()).await);
}

#[tokio::test]
async fn test_rotate_store_outage() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    h.store.set_available(false);

    let result = h.sessions.rotate(&pair.refresh_token).await;

    assert!(matches!(result, Err(TokenError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.sessions
        .logout(Some(pair.access_jti.as_str()), Some(pair.refresh_jti.as_str()))
        .await
        .unwrap();
    assert!(h.store.is_empty().await);

    h.sessions
        .logout(Some(pair.access_jti.as_str()), Some(pair.refresh_jti.as_str()))
        .await
        .unwrap();
    assert!(h.store.is_empty().await);

    assert_eq!(
        h.sessions.authenticate(&pair.access_token).await,
        Err(TokenError::RevokedOrUnknownToken)
    );
    assert_eq!(
        h.sessions.rotate(&pair.refresh_token).await.map(|r| r.principal_id),
        Err(TokenError::RevokedOrUnknownToken)
    );
}

#[tokio::test]
async fn test_logout_tokens_accepts_expired_access() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.clock.advance(Duration::hours(1));
    h.sessions
        .logout_tokens(Some(pair.access_token.as_str()), Some(pair.refresh_token.as_str()))
        .await
        .unwrap();

    assert!(!h.store.contains(&pair.refresh_key()).await);
    assert!(h.sessions.rotate(&pair.refresh_token).await.is_err());
}

#[tokio::test]
async fn test_logout_tokens_ignores_garbage() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.sessions
        .logout_tokens(Some("garbage"), Some(pair.refresh_token.as_str()))
        .await
        .unwrap();

    assert!(h.store.contains(&pair.access_key()).await);
    assert!(!h.store.contains(&pair.refresh_key()).await);
}

#[tokio::test]
async fn test_multiple_sessions_are_independent() {
    let h = harness();
    let tablet = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    let laptop = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();

    h.sessions
        .logout(Some(tablet.access_jti.as_str()), Some(tablet.refresh_jti.as_str()))
        .await
        .unwrap();

    assert!(h.sessions.authenticate(&laptop.access_token).await.is_ok());
    assert!(h.sessions.rotate(&laptop.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_reset_token_single_use() {
    let h = harness();
    let reset = h.sessions.issue_reset_token(&principal(42, "a@b.com")).await.unwrap();
    assert!(h.store.contains(&reset.key()).await);

    assert_eq!(h.sessions.redeem_reset_token(&reset.token).await, Ok(42));
    assert_eq!(
        h.sessions.redeem_reset_token(&reset.token).await,
        Err(TokenError::RevokedOrUnknownToken)
    );
}

#[tokio::test]
async fn test_reset_token_expires() {
    let h = harness();
    let reset = h.sessions.issue_reset_token(&principal(42, "a@b.com")).await.unwrap();

    h.clock.advance(Duration::minutes(15));

    assert_eq!(
        h.sessions.redeem_reset_token(&reset.token).await,
        Err(TokenError::ExpiredToken)
    );
}

#[tokio::test]
async fn test_reset_token_is_not_a_session() {
    let h = harness();
    let reset = h.sessions.issue_reset_token(&principal(42, "a@b.com")).await.unwrap();

    assert_eq!(
        h.sessions.authenticate(&reset.token).await,
        Err(TokenError::InvalidSignature)
    );
}

/// Scenario: id 42 logs in, the access token lapses after 16 minutes and the
/// refresh token mints a new pair.
#[tokio::test]
async fn test_sixteen_minute_rotation_scenario() {
    let h = harness();
    let t1 = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    assert!(h.store.contains(&t1.access_key()).await);
    assert!(h.store.contains(&t1.refresh_key()).await);

    h.clock.advance(Duration::minutes(16));
    assert_eq!(
        h.sessions.authenticate(&t1.access_token).await,
        Err(TokenError::ExpiredToken)
    );

    let t2 = h.sessions.rotate_for(&t1.refresh_token, Some(42)).await.unwrap();

    assert!(!h.store.contains(&t1.refresh_key()).await);
    assert!(h.store.contains(&t2.pair.refresh_key()).await);
    assert_eq!(t2.identity().principal_id, 42);
}

#[tokio::test]
async fn test_revoke_all_ends_every_session_of_principal() {
    let h = harness();
    let first = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    let second = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    let other = h.sessions.login(&principal(7, "c@d.com")).await.unwrap();
    let rotated = h.sessions.rotate(&first.refresh_token).await.unwrap();

    // first access, second pair and the rotated pair
    assert_eq!(h.sessions.revoke_all(42).await, Ok(5));

    for access in [&first.access_token, &second.access_token, &rotated.pair.access_token] {
        assert_eq!(
            h.sessions.authenticate(access).await,
            Err(TokenError::RevokedOrUnknownToken)
        );
    }
    for refresh in [&second.refresh_token, &rotated.pair.refresh_token] {
        assert_eq!(
            h.sessions.rotate(refresh).await.map(|r| r.principal_id),
            Err(TokenError::RevokedOrUnknownToken)
        );
    }

    assert!(h.sessions.authenticate(&other.access_token).await.is_ok());
    assert_eq!(h.store.len().await, 2);

    // Nothing left to revoke
    assert_eq!(h.sessions.revoke_all(42).await, Ok(0));
}

#[tokio::test]
async fn test_revoke_all_store_outage() {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    h.store.set_available(false);

    assert!(matches!(
        h.sessions.revoke_all(42).await,
        Err(TokenError::StoreUnavailable { .. })
    ));

    h.store.set_available(true);
    assert!(h.sessions.authenticate(&pair.access_token).await.is_ok());
}

#[tokio::test]
async fn test_revoke_all_leaves_reset_tokens_alone() {
    let h = harness();
    h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    let reset = h.sessions.issue_reset_token(&principal(42, "a@b.com")).await.unwrap();

    assert_eq!(h.sessions.revoke_all(42).await, Ok(2));
    assert!(h.store.contains(&reset.key()).await);
}
