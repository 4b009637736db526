//! HMAC keys for each token class

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::domain::entities::TokenKind;

use super::config::TokenServiceConfig;

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signing and verification keys, one pair per token class
#[derive(Clone)]
pub struct TokenKeys {
    access: KeyPair,
    refresh: KeyPair,
    reset: KeyPair,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenKeys { .. }")
    }
}

impl TokenKeys {
    pub fn from_config(config: &TokenServiceConfig) -> Self {
        Self {
            access: KeyPair::from_secret(config.secret_for(TokenKind::Access)),
            refresh: KeyPair::from_secret(config.secret_for(TokenKind::Refresh)),
            reset: KeyPair::from_secret(config.secret_for(TokenKind::Reset)),
        }
    }

    fn pair(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
            TokenKind::Reset => &self.reset,
        }
    }

    pub fn encoding_key(&self, kind: TokenKind) -> &EncodingKey {
        &self.pair(kind).encoding
    }

    pub fn decoding_key(&self, kind: TokenKind) -> &DecodingKey {
        &self.pair(kind).decoding
    }
}
