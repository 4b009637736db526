//! Unit tests for token verification

use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::{engine, test_config};
use crate::clock::Clock;
use crate::domain::entities::{Claims, TokenKind};
use crate::errors::TokenError;

#[test]
fn test_round_trip_recovers_principal() {
    let (issuer, verifier, _clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();

    let claims = verifier
        .verify_with_secret(&pair.access_token, "test-access-secret")
        .unwrap();

    assert_eq!(claims.user_id(), 42);
    assert_eq!(claims.email, "a@b.com");
}

#[test]
fn test_wrong_secret_is_invalid_signature() {
    let (issuer, verifier, _clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();

    assert_eq!(
        verifier.verify_with_secret(&pair.access_token, "some-other-secret"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_token_classes_do_not_cross_verify() {
    let (issuer, verifier, _clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();
    let reset = issuer.issue_reset_token(42, "a@b.com").unwrap();

    assert_eq!(
        verifier.verify(&pair.access_token, TokenKind::Refresh),
        Err(TokenError::InvalidSignature)
    );
    assert_eq!(
        verifier.verify(&pair.refresh_token, TokenKind::Access),
        Err(TokenError::InvalidSignature)
    );
    assert_eq!(
        verifier.verify(&reset.token, TokenKind::Access),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_expiry_boundary() {
    let (issuer, verifier, clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();

    clock.advance(Duration::minutes(15) - Duration::seconds(1));
    assert!(verifier.verify(&pair.access_token, TokenKind::Access).is_ok());

    // exp == now is already expired
    clock.advance(Duration::seconds(1));
    assert_eq!(
        verifier.verify(&pair.access_token, TokenKind::Access),
        Err(TokenError::ExpiredToken)
    );
    assert!(verifier.verify(&pair.refresh_token, TokenKind::Refresh).is_ok());
}

#[test]
fn test_decode_ignoring_expiry() {
    let (issuer, verifier, clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();

    clock.advance(Duration::days(30));

    let claims = verifier
        .decode_ignoring_expiry(&pair.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.jti, pair.access_jti);

    assert_eq!(
        verifier.decode_ignoring_expiry(&pair.access_token, TokenKind::Refresh),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_malformed_input() {
    let (_issuer, verifier, _clock) = engine();

    for garbage in ["", "   ", "not-a-token", "a.b", "a.b.c"] {
        assert_eq!(
            verifier.verify(garbage, TokenKind::Access),
            Err(TokenError::MalformedCredential),
            "input: {:?}",
            garbage
        );
    }
}

#[test]
fn test_tampered_payload_is_rejected() {
    let (issuer, verifier, _clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();
    let other = issuer.issue_token_pair(1, "root@b.com").unwrap();

    // Splice another token's payload under this token's signature
    let parts: Vec<&str> = pair.access_token.split('.').collect();
    let other_parts: Vec<&str> = other.access_token.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert_eq!(
        verifier.verify(&forged, TokenKind::Access),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_alg_none_is_rejected() {
    let (issuer, verifier, _clock) = engine();
    let pair = issuer.issue_token_pair(42, "a@b.com").unwrap();
    let payload = pair.access_token.split('.').nth(1).unwrap();

    // {"alg":"none","typ":"JWT"}
    let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

    let result = verifier.verify(&unsigned, TokenKind::Access);
    assert!(matches!(
        result,
        Err(TokenError::MalformedCredential) | Err(TokenError::InvalidSignature)
    ));
}

#[test]
fn test_other_algorithm_is_rejected() {
    let (_issuer, verifier, clock) = engine();
    let now = clock.now();
    let claims = Claims {
        sub: "42".to_string(),
        user_id: 42,
        email: "a@b.com".to_string(),
        jti: "hs512".to_string(),
        iss: "cbt-backend".to_string(),
        aud: "cbt-users".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(5)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(test_config().access_secret.as_bytes()),
    )
    .unwrap();

    assert_eq!(
        verifier.verify(&token, TokenKind::Access),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let (_issuer, verifier, clock) = engine();
    let now = clock.now();
    let claims = Claims {
        sub: "42".to_string(),
        user_id: 42,
        email: "a@b.com".to_string(),
        jti: "foreign".to_string(),
        iss: "someone-else".to_string(),
        aud: "cbt-users".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(5)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(test_config().access_secret.as_bytes()),
    )
    .unwrap();

    assert_eq!(
        verifier.verify(&token, TokenKind::Access),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_subject_mismatch_is_malformed() {
    let (_issuer, verifier, clock) = engine();
    let now = clock.now();
    let claims = Claims {
        sub: "1".to_string(),
        user_id: 42,
        email: "a@b.com".to_string(),
        jti: "mismatch".to_string(),
        iss: "cbt-backend".to_string(),
        aud: "cbt-users".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(5)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(test_config().access_secret.as_bytes()),
    )
    .unwrap();

    assert_eq!(
        verifier.verify(&token, TokenKind::Access),
        Err(TokenError::MalformedCredential)
    );
}
