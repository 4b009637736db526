//! Session manager implementation

use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::entities::{
    Principal, PrincipalId, ResetToken, RevocationKey, TokenKind, TokenPair,
};
use crate::domain::value_objects::{Identity, Rotation};
use crate::errors::TokenError;
use crate::repositories::revocation::{remaining_ttl, RevocationStore};
use crate::services::token::{TokenIssuer, TokenVerifier};

/// Composes issuer, verifier and revocation store
///
/// Every trusted token has a `<namespace>:<jti>` entry in the store. Issuance
/// writes entries, rotation and logout delete them.
pub struct SessionManager<S: RevocationStore> {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: RevocationStore + 'static> SessionManager<S> {
    /// Creates a new session manager
    pub fn new(
        issuer: TokenIssuer,
        verifier: TokenVerifier,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer,
            verifier,
            store,
            clock,
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Time source shared with the issuer and verifier
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Issues a token pair and registers both JTIs
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Both entries persisted
    /// * `Err(TokenError::PersistFailed)` - A store write failed; the minted
    ///   tokens must be discarded
    /// * `Err(TokenError::SigningFailure)` - Encoding failed
    pub async fn login(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        let pair = self.issuer.issue_token_pair(principal.id, &principal.email)?;
        self.persist_pair(principal.id, &pair).await?;

        tracing::debug!(
            principal_id = principal.id,
            access_jti = %pair.access_jti,
            refresh_jti = %pair.refresh_jti,
            "Session opened"
        );
        Ok(pair)
    }

    /// Resolves a presented access token to an identity
    ///
    /// Signature and expiry are checked first, then the `access:` entry must
    /// exist and belong to the token's principal.
    pub async fn authenticate(&self, access_token: &str) -> Result<Identity, TokenError> {
        let claims = self.verifier.verify(access_token, TokenKind::Access)?;
        let key = RevocationKey::access(claims.jti.clone());

        match self.store.get(&key).await? {
            Some(owner) if owner == claims.user_id => Ok(Identity {
                principal_id: claims.user_id,
                email: claims.email,
                access_jti: claims.jti,
            }),
            _ => Err(TokenError::RevokedOrUnknownToken),
        }
    }

    /// Exchanges a refresh token for a new pair
    pub async fn rotate(&self, refresh_token: &str) -> Result<Rotation, TokenError> {
        self.rotate_for(refresh_token, None).await
    }

    /// Exchanges a refresh token for a new pair, optionally requiring that it
    /// belongs to `expected`
    ///
    /// The old `refresh:` entry is deleted before the new pair is minted. Only
    /// the caller whose delete removed the entry may mint, so concurrent
    /// presentations of one refresh token yield at most one new pair. A
    /// failure after the delete leaves the principal signed out.
    pub async fn rotate_for(
        &self,
        refresh_token: &str,
        expected: Option<PrincipalId>,
    ) -> Result<Rotation, TokenError> {
        let claims = self.verifier.verify(refresh_token, TokenKind::Refresh)?;

        if expected.is_some_and(|id| id != claims.user_id) {
            tracing::warn!(
                principal_id = claims.user_id,
                "Refresh token presented alongside another principal's access token"
            );
            return Err(TokenError::RevokedOrUnknownToken);
        }

        let key = RevocationKey::refresh(claims.jti.clone());
        match self.store.get(&key).await? {
            Some(owner) if owner == claims.user_id => {}
            _ => return Err(TokenError::RevokedOrUnknownToken),
        }

        if !self.consume(key).await? {
            tracing::info!(
                principal_id = claims.user_id,
                "Refresh token consumed by a concurrent rotation"
            );
            return Err(TokenError::RevokedOrUnknownToken);
        }

        let pair = self.issuer.issue_token_pair(claims.user_id, &claims.email)?;
        self.persist_pair(claims.user_id, &pair).await?;

        tracing::info!(
            principal_id = claims.user_id,
            old_refresh_jti = %claims.jti,
            new_refresh_jti = %pair.refresh_jti,
            "Session rotated"
        );

        Ok(Rotation {
            principal_id: claims.user_id,
            email: claims.email,
            pair,
        })
    }

    /// Deletes the entries of both JTIs
    ///
    /// Idempotent: absent entries are not an error.
    pub async fn logout(
        &self,
        access_jti: Option<&str>,
        refresh_jti: Option<&str>,
    ) -> Result<(), TokenError> {
        if let Some(jti) = access_jti {
            self.consume(RevocationKey::access(jti)).await?;
        }
        if let Some(jti) = refresh_jti {
            self.consume(RevocationKey::refresh(jti)).await?;
        }
        Ok(())
    }

    /// Logs out using the presented token strings
    ///
    /// Tokens are decoded ignoring expiry. A token that does not verify has
    /// no entry this system would trust, so it is skipped.
    pub async fn logout_tokens(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), TokenError> {
        let access_jti = access_token.and_then(|t| self.jti_of(t, TokenKind::Access));
        let refresh_jti = refresh_token.and_then(|t| self.jti_of(t, TokenKind::Refresh));

        self.logout(access_jti.as_deref(), refresh_jti.as_deref())
            .await?;

        tracing::debug!(
            access_revoked = access_jti.is_some(),
            refresh_revoked = refresh_jti.is_some(),
            "Session closed"
        );
        Ok(())
    }

    /// Issues a reset token and registers its `reset:` entry
    pub async fn issue_reset_token(&self, principal: &Principal) -> Result<ResetToken, TokenError> {
        let reset = self.issuer.issue_reset_token(principal.id, &principal.email)?;
        self.persist(&reset.key(), principal.id, reset.expires_at)
            .await?;
        Ok(reset)
    }

    /// Verifies and consumes a reset token
    ///
    /// Succeeds at most once per token. Returns the principal whose password
    /// may now be replaced.
    pub async fn redeem_reset_token(&self, token: &str) -> Result<PrincipalId, TokenError> {
        let claims = self.verifier.verify(token, TokenKind::Reset)?;
        let key = RevocationKey::reset(claims.jti.clone());

        match self.store.get(&key).await? {
            Some(owner) if owner == claims.user_id => {}
            _ => return Err(TokenError::RevokedOrUnknownToken),
        }

        if !self.consume(key).await? {
            return Err(TokenError::RevokedOrUnknownToken);
        }

        tracing::info!(principal_id = claims.user_id, "Reset token redeemed");
        Ok(claims.user_id)
    }

    /// Revokes every access and refresh entry of a principal
    ///
    /// Used when the credentials of the principal change; all sessions opened
    /// before the call stop being trusted at once.
    pub async fn revoke_all(&self, principal_id: PrincipalId) -> Result<usize, TokenError> {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move { store.revoke_sessions(principal_id).await });

        let revoked = match handle.await {
            Ok(result) => result.map_err(TokenError::from)?,
            Err(e) => {
                return Err(TokenError::StoreUnavailable {
                    message: format!("session revocation task failed: {}", e),
                })
            }
        };

        tracing::info!(principal_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    fn jti_of(&self, token: &str, kind: TokenKind) -> Option<String> {
        match self.verifier.decode_ignoring_expiry(token, kind) {
            Ok(claims) => Some(claims.jti),
            Err(e) => {
                tracing::debug!(kind = %kind, error = e.kind(), "Ignoring unverifiable token on logout");
                None
            }
        }
    }

    async fn persist_pair(&self, principal_id: PrincipalId, pair: &TokenPair) -> Result<(), TokenError> {
        self.persist(&pair.access_key(), principal_id, pair.access_expires_at)
            .await?;

        if let Err(e) = self
            .persist(&pair.refresh_key(), principal_id, pair.refresh_expires_at)
            .await
        {
            // Do not leave a half-registered pair behind
            self.discard(&[pair.access_key()]).await;
            return Err(e);
        }

        if let Err(e) = self.index_pair(principal_id, pair).await {
            // An unindexed pair would survive a password reset
            self.discard(&[pair.access_key(), pair.refresh_key()]).await;
            return Err(e);
        }

        Ok(())
    }

    async fn index_pair(&self, principal_id: PrincipalId, pair: &TokenPair) -> Result<(), TokenError> {
        let now = self.clock.now();
        for (key, expires_at) in [
            (pair.access_key(), pair.access_expires_at),
            (pair.refresh_key(), pair.refresh_expires_at),
        ] {
            let ttl = remaining_ttl(expires_at, now).unwrap_or_default();
            self.store
                .track_session(principal_id, &key, ttl)
                .await
                .map_err(|e| {
                    tracing::error!(key_kind = %key.kind, error = %e, "Failed to index session entry");
                    TokenError::PersistFailed {
                        message: e.to_string(),
                    }
                })?;
        }
        Ok(())
    }

    async fn discard(&self, keys: &[RevocationKey]) {
        for key in keys {
            if let Err(e) = self.consume(key.clone()).await {
                tracing::warn!(key_kind = %key.kind, error = %e, "Failed to remove entry of discarded pair");
            }
        }
    }

    async fn persist(
        &self,
        key: &RevocationKey,
        principal_id: PrincipalId,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), TokenError> {
        let Some(ttl) = remaining_ttl(expires_at, self.clock.now()) else {
            return Err(TokenError::PersistFailed {
                message: format!("{} token already expired at issuance", key.kind),
            });
        };

        self.store
            .put(key, principal_id, ttl)
            .await
            .map_err(|e| {
                tracing::error!(key_kind = %key.kind, error = %e, "Failed to persist revocation entry");
                TokenError::PersistFailed {
                    message: e.to_string(),
                }
            })
    }

    /// Deletes an entry on a detached task
    ///
    /// The delete runs to completion even if the calling request is dropped
    /// while awaiting it. Returns whether this call removed a live entry.
    async fn consume(&self, key: RevocationKey) -> Result<bool, TokenError> {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move { store.delete(&key).await });

        match handle.await {
            Ok(result) => result.map_err(TokenError::from),
            Err(e) => Err(TokenError::StoreUnavailable {
                message: format!("revocation delete task failed: {}", e),
            }),
        }
    }
}
