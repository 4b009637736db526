//! Revocation store trait: the server-side registry of live token identifiers.
//!
//! A token whose signature and expiry check out is still only trusted while
//! its entry exists here. Entries are keyed by [`RevocationKey`] and carry the
//! owning principal id; their lifetime equals the token's remaining validity.
//! Access and refresh entries are also indexed per principal so that every
//! session of one principal can be revoked at once.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{PrincipalId, RevocationKey};
use crate::errors::DomainError;

/// Repository trait for revocation entries
///
/// Operations on the same key must be linearizable. Outages are reported as
/// `DomainError::Token(TokenError::StoreUnavailable)` and must never be
/// reported as a missing entry.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Insert or overwrite an entry with the given lifetime
    ///
    /// A zero `ttl` is a no-op: the entry would already be expired.
    async fn put(
        &self,
        key: &RevocationKey,
        principal_id: PrincipalId,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Look up the principal owning a live entry
    ///
    /// # Returns
    /// * `Ok(Some(id))` - Entry is live
    /// * `Ok(None)` - Never existed, deleted, or expired; callers must not
    ///   distinguish these
    /// * `Err(DomainError)` - Store unavailable
    async fn get(&self, key: &RevocationKey) -> Result<Option<PrincipalId>, DomainError>;

    /// Remove an entry
    ///
    /// # Returns
    /// * `Ok(true)` - A live entry was removed by this call
    /// * `Ok(false)` - Nothing to remove (not an error)
    /// * `Err(DomainError)` - Store unavailable
    async fn delete(&self, key: &RevocationKey) -> Result<bool, DomainError>;

    /// Record `key` in the session index of `principal_id`
    ///
    /// The index lives at least as long as `ttl`. A zero `ttl` is a no-op.
    async fn track_session(
        &self,
        principal_id: PrincipalId,
        key: &RevocationKey,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Delete every indexed entry of `principal_id`, then the index itself
    ///
    /// # Returns
    /// * `Ok(n)` - Number of live entries removed
    /// * `Err(DomainError)` - Store unavailable
    async fn revoke_sessions(&self, principal_id: PrincipalId) -> Result<usize, DomainError>;
}

/// Lifetime for an entry of a token expiring at `expires_at`
///
/// Returns `None` when the token is already expired, in which case the entry
/// must not be written.
pub fn remaining_ttl(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    let remaining = expires_at - now;
    if remaining <= chrono::Duration::zero() {
        return None;
    }
    remaining.to_std().ok()
}
