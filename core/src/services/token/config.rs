//! Configuration for the token engine

use chrono::Duration;
use jsonwebtoken::Algorithm;

use cbt_shared::config::JwtConfig;

use crate::domain::entities::TokenKind;

/// Configuration for the token engine
///
/// Built once at startup and injected into the issuer and verifier.
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Secret for access tokens
    pub access_secret: String,
    /// Secret for refresh tokens
    pub refresh_secret: String,
    /// Secret for password reset tokens
    pub reset_secret: String,
    /// JWT signing algorithm; only symmetric HMAC is accepted
    pub algorithm: Algorithm,
    pub access_token_expiry: Duration,
    pub refresh_token_expiry: Duration,
    pub reset_token_expiry: Duration,
    pub issuer: String,
    pub audience: String,
}

impl TokenServiceConfig {
    /// Secret used to sign tokens of `kind`
    pub fn secret_for(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
            TokenKind::Reset => &self.reset_secret,
        }
    }

    /// Lifetime of tokens of `kind`
    pub fn lifetime_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_expiry,
            TokenKind::Refresh => self.refresh_token_expiry,
            TokenKind::Reset => self.reset_token_expiry,
        }
    }
}

impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("reset_token_expiry", &self.reset_token_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            access_secret: jwt.access_secret.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            reset_secret: jwt.reset_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_expiry: Duration::seconds(jwt.access_token_expiry),
            refresh_token_expiry: Duration::seconds(jwt.refresh_token_expiry),
            reset_token_expiry: Duration::seconds(jwt.reset_token_expiry),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}
