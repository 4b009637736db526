//! Token verification
//!
//! Verification is pure: it proves a token was signed by this system and is
//! within its validity window. It does not consult the revocation store.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::clock::Clock;
use crate::domain::entities::{Claims, TokenKind};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::keys::TokenKeys;

/// Validates signature, structure and expiry of presented tokens
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<TokenKeys>,
    validation: Arc<Validation>,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Creates a new verifier
    pub fn new(config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        // Expiry is checked against the injected clock, not the library's
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            keys: Arc::new(TokenKeys::from_config(config)),
            validation: Arc::new(validation),
            clock,
        }
    }

    /// Verifies a token of the given class
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature valid and not expired
    /// * `Err(TokenError::ExpiredToken)` - `exp <= now`
    /// * `Err(TokenError::InvalidSignature)` - Wrong key, algorithm, issuer or audience
    /// * `Err(TokenError::MalformedCredential)` - Not a well-formed token
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.decode_with(token, self.keys.decoding_key(kind))?;
        self.check_expiry(claims)
    }

    /// Verifies a token against an explicit secret
    pub fn verify_with_secret(&self, token: &str, secret: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let claims = self.decode_with(token, &key)?;
        self.check_expiry(claims)
    }

    /// Verifies signature and structure but accepts expired tokens
    ///
    /// Used by logout, which must work with whatever the client still holds.
    pub fn decode_ignoring_expiry(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        self.decode_with(token, self.keys.decoding_key(kind))
    }

    fn decode_with(&self, token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::MalformedCredential);
        }

        let data = decode::<Claims>(token, key, &self.validation).map_err(map_decode_error)?;
        let claims = data.claims;

        if claims.jti.is_empty() || claims.sub != claims.user_id.to_string() {
            return Err(TokenError::MalformedCredential);
        }

        Ok(claims)
    }

    fn check_expiry(&self, claims: Claims) -> Result<Claims, TokenError> {
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::ExpiredToken);
        }
        Ok(claims)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::MalformedCredential,
    }
}
