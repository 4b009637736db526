//! Unit tests for the auth gate state machine

use std::sync::Arc;

use chrono::Duration;

use crate::errors::TokenError;
use crate::repositories::revocation::RevocationStore;
use crate::services::gate::{AuthGate, GateVerdict, Gatekeeper, PresentedCredentials};
use crate::services::session::tests::{harness, principal, Harness};
use crate::domain::entities::TokenPair;
use crate::repositories::InMemoryRevocationStore;

async fn setup() -> (AuthGate<InMemoryRevocationStore>, Harness, TokenPair) {
    let h = harness();
    let pair = h.sessions.login(&principal(42, "a@b.com")).await.unwrap();
    (AuthGate::new(Arc::clone(&h.sessions)), h, pair)
}

fn creds(access: Option<&str>, refresh: Option<&str>) -> PresentedCredentials {
    PresentedCredentials::new(access.map(str::to_string), refresh.map(str::to_string))
}

#[tokio::test]
async fn test_no_credential_is_unauthorized() {
    let (gate, _h, _pair) = setup().await;

    let verdict = gate.evaluate(PresentedCredentials::default()).await.unwrap();

    assert!(!verdict.is_authorized());
}

#[tokio::test]
async fn test_live_access_token_is_authorized() {
    let (gate, _h, pair) = setup().await;

    let verdict = gate.evaluate(creds(Some(pair.access_token.as_str()), None)).await.unwrap();

    match verdict {
        GateVerdict::Authorized { identity, rotated } => {
            assert_eq!(identity.principal_id, 42);
            assert!(rotated.is_none());
        }
        other => panic!("expected Authorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_signature_is_unauthorized() {
    let (gate, _h, pair) = setup().await;
    let mut tampered = pair.access_token.clone();
    tampered.push('x');

    let verdict = gate.evaluate(creds(Some(tampered.as_str()), Some(pair.refresh_token.as_str()))).await.unwrap();

    assert!(!verdict.is_authorized());
}

#[tokio::test]
async fn test_revoked_access_token_does_not_rotate() {
    let (gate, h, pair) = setup().await;
    h.store.delete(&pair.access_key()).await.unwrap();

    let verdict = gate
        .evaluate(creds(Some(pair.access_token.as_str()), Some(pair.refresh_token.as_str())))
        .await
        .unwrap();

    assert_eq!(
        verdict,
        GateVerdict::Unauthorized {
            reason: TokenError::RevokedOrUnknownToken
        }
    );
    assert!(h.store.contains(&pair.refresh_key()).await);
}

#[tokio::test]
async fn test_expired_access_rotates_once() {
    let (gate, h, pair) = setup().await;
    h.clock.advance(Duration::minutes(16));

    let verdict = gate
        .evaluate(creds(Some(pair.access_token.as_str()), Some(pair.refresh_token.as_str())))
        .await
        .unwrap();

    let rotated = match verdict {
        GateVerdict::Authorized {
            identity,
            rotated: Some(rotated),
        } => {
            assert_eq!(identity.principal_id, 42);
            assert_eq!(identity.access_jti, rotated.access_jti);
            rotated
        }
        other => panic!("expected rotation, got {:?}", other),
    };

    assert!(!h.store.contains(&pair.refresh_key()).await);
    assert!(h.store.contains(&rotated.refresh_key()).await);

    // Replaying the consumed refresh token fails
    let replay = gate
        .evaluate(creds(Some(pair.access_token.as_str()), Some(pair.refresh_token.as_str())))
        .await
        .unwrap();
    assert_eq!(
        replay,
        GateVerdict::Unauthorized {
            reason: TokenError::RevokedOrUnknownToken
        }
    );

    // The new access token works without rotating again
    let next = gate.evaluate(creds(Some(rotated.access_token.as_str()), None)).await.unwrap();
    assert!(matches!(next, GateVerdict::Authorized { rotated: None, .. }));
}

#[tokio::test]
async fn test_expired_access_without_refresh() {
    let (gate, h, pair) = setup().await;
    h.clock.advance(Duration::minutes(16));

    let verdict = gate.evaluate(creds(Some(pair.access_token.as_str()), None)).await.unwrap();

    assert_eq!(
        verdict,
        GateVerdict::Unauthorized {
            reason: TokenError::ExpiredToken
        }
    );
}

#[tokio::test]
async fn test_refresh_of_another_principal_is_refused() {
    let (gate, h, pair) = setup().await;
    let other = h.sessions.login(&principal(7, "other@b.com")).await.unwrap();
    h.clock.advance(Duration::minutes(16));

    let verdict = gate
        .evaluate(creds(Some(pair.access_token.as_str()), Some(other.refresh_token.as_str())))
        .await
        .unwrap();

    assert!(!verdict.is_authorized());
    assert!(h.store.contains(&other.refresh_key()).await);
}

#[tokio::test]
async fn test_store_outage_is_an_error_not_a_verdict() {
    let (gate, h, pair) = setup().await;
    h.store.set_available(false);

    let result = gate.evaluate(creds(Some(pair.access_token.as_str()), None)).await;

    assert!(matches!(result, Err(TokenError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_store_outage_during_rotation() {
    let (gate, h, pair) = setup().await;
    h.clock.advance(Duration::minutes(16));
    h.store.set_available(false);

    let result = gate
        .evaluate(creds(Some(pair.access_token.as_str()), Some(pair.refresh_token.as_str())))
        .await;

    assert!(matches!(result, Err(TokenError::StoreUnavailable { .. })));
}
