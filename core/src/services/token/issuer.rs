//! Token issuance

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use jsonwebtoken::{encode, Header};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::{Claims, PrincipalId, ResetToken, SignedToken, TokenKind, TokenPair};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::keys::TokenKeys;

/// Creates signed access, refresh and password reset tokens
///
/// Issuance has no side effects: nothing is persisted here.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: Arc<TokenServiceConfig>,
    keys: Arc<TokenKeys>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Creates a new issuer
    pub fn new(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let keys = TokenKeys::from_config(&config);
        Self {
            config: Arc::new(config),
            keys: Arc::new(keys),
            clock,
        }
    }

    /// Issues an access and refresh token for the same principal
    ///
    /// The two tokens carry different JTIs and expiries.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The signed pair
    /// * `Err(TokenError::SigningFailure)` - Encoding failed
    pub fn issue_token_pair(
        &self,
        principal_id: PrincipalId,
        email: &str,
    ) -> Result<TokenPair, TokenError> {
        let access = self.sign(TokenKind::Access, principal_id, email)?;
        let refresh = self.sign(TokenKind::Refresh, principal_id, email)?;
        Ok(TokenPair::from_parts(access, refresh))
    }

    /// Issues a single-purpose password reset token
    pub fn issue_reset_token(
        &self,
        principal_id: PrincipalId,
        email: &str,
    ) -> Result<ResetToken, TokenError> {
        let signed = self.sign(TokenKind::Reset, principal_id, email)?;
        Ok(ResetToken {
            token: signed.token,
            jti: signed.jti,
            principal_id,
            expires_at: signed.expires_at,
        })
    }

    /// Signs one token of `kind` with a fresh JTI
    pub fn sign(
        &self,
        kind: TokenKind,
        principal_id: PrincipalId,
        email: &str,
    ) -> Result<SignedToken, TokenError> {
        let now = self.clock.now();
        let expiry = now + self.config.lifetime_for(kind);

        let claims = Claims {
            sub: principal_id.to_string(),
            user_id: principal_id,
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        let header = Header::new(self.config.algorithm);
        let token = encode(&header, &claims, self.keys.encoding_key(kind)).map_err(|e| {
            TokenError::SigningFailure {
                message: e.to_string(),
            }
        })?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::SigningFailure {
                message: format!("expiry out of range: {}", claims.exp),
            })?;

        Ok(SignedToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    /// Current time as seen by the issuer
    pub fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }
}
