//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::principal::PrincipalId;

/// Class of a signed token
///
/// Each class has its own signing secret, lifetime and revocation namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

impl TokenKind {
    /// Namespace used for revocation keys of this class
    pub fn namespace(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Reset => "reset",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Key of a revocation entry, rendered as `<namespace>:<jti>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevocationKey {
    pub kind: TokenKind,
    pub jti: String,
}

impl RevocationKey {
    pub fn new(kind: TokenKind, jti: impl Into<String>) -> Self {
        Self {
            kind,
            jti: jti.into(),
        }
    }

    pub fn access(jti: impl Into<String>) -> Self {
        Self::new(TokenKind::Access, jti)
    }

    pub fn refresh(jti: impl Into<String>) -> Self {
        Self::new(TokenKind::Refresh, jti)
    }

    pub fn reset(jti: impl Into<String>) -> Self {
        Self::new(TokenKind::Reset, jti)
    }
}

impl std::fmt::Display for RevocationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.namespace(), self.jti)
    }
}

/// Claims structure for JWT payload
///
/// Immutable once signed. Access and refresh tokens of one pair carry the
/// same principal but different `jti` and `exp` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id as a string)
    pub sub: String,

    /// Principal id
    pub user_id: PrincipalId,

    /// Principal email at issuance time
    pub email: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at timestamp (seconds)
    pub iat: i64,

    /// Expiration timestamp (seconds)
    pub exp: i64,
}

impl Claims {
    /// Principal the token was issued to
    pub fn user_id(&self) -> PrincipalId {
        self.user_id
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        from_seconds(self.exp)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        from_seconds(self.iat)
    }

    /// A token whose expiry equals `now` is already expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

fn from_seconds(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A freshly signed token together with its identifier and expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a login or rotation: a signed access and refresh token
///
/// Never mutated; superseded by the next rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_jti: String,
    pub refresh_jti: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    pub fn from_parts(access: SignedToken, refresh: SignedToken) -> Self {
        Self {
            access_token: access.token,
            refresh_token: refresh.token,
            access_jti: access.jti,
            refresh_jti: refresh.jti,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        }
    }

    /// Seconds until the access token expires, never negative
    pub fn access_expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.access_expires_at - now).num_seconds().max(0)
    }

    /// Seconds until the refresh token expires, never negative
    pub fn refresh_expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.refresh_expires_at - now).num_seconds().max(0)
    }

    pub fn access_key(&self) -> RevocationKey {
        RevocationKey::access(self.access_jti.clone())
    }

    pub fn refresh_key(&self) -> RevocationKey {
        RevocationKey::refresh(self.refresh_jti.clone())
    }
}

/// Single-purpose password reset token bound to one principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub token: String,
    pub jti: String,
    pub principal_id: PrincipalId,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn key(&self) -> RevocationKey {
        RevocationKey::reset(self.jti.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(exp: i64) -> Claims {
        Claims {
            sub: "42".to_string(),
            user_id: 42,
            email: "a@b.com".to_string(),
            jti: "jti-1".to_string(),
            iss: "cbt-backend".to_string(),
            aud: "cbt-users".to_string(),
            iat: exp - 900,
            exp,
        }
    }

    #[test]
    fn test_revocation_key_format() {
        assert_eq!(RevocationKey::access("abc").to_string(), "access:abc");
        assert_eq!(RevocationKey::refresh("abc").to_string(), "refresh:abc");
        assert_eq!(RevocationKey::reset("abc").to_string(), "reset:abc");
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = claims(now.timestamp());

        assert!(claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now - Duration::seconds(1)));
        assert_eq!(claims.expires_at(), now);
    }

    #[test]
    fn test_pair_expires_in_is_clamped() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            access_jti: "aj".to_string(),
            refresh_jti: "rj".to_string(),
            access_expires_at: now + Duration::minutes(15),
            refresh_expires_at: now + Duration::days(7),
        };

        assert_eq!(pair.access_expires_in(now), 900);
        assert_eq!(pair.access_expires_in(now + Duration::hours(1)), 0);
        assert_eq!(pair.refresh_expires_in(now), 604800);
        assert_eq!(pair.refresh_key().to_string(), "refresh:rj");
    }
}
