//! Redis-backed revocation registry
//!
//! Each live credential is a key `<class>:<jti>` holding the owning principal
//! id, written with PSETEX so Redis expires it together with the token.
//! DEL's reply count makes single-use consumption atomic across instances.
//! Access and refresh keys are also members of a per-principal set
//! `sessions:<id>` so one call can revoke every session of a principal.

use std::time::Duration;

use async_trait::async_trait;

use cbt_core::domain::entities::{PrincipalId, RevocationKey};
use cbt_core::errors::DomainError;
use cbt_core::repositories::RevocationStore;

use super::redis_client::RedisClient;

/// Revocation store over a shared [`RedisClient`]
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

/// Key of the session index set of a principal
pub(crate) fn session_index_key(principal_id: PrincipalId) -> String {
    format!("sessions:{}", principal_id)
}

/// Millisecond TTL for PSETEX; sub-millisecond remainders round up to 1
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    millis.max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn put(
        &self,
        key: &RevocationKey,
        principal_id: PrincipalId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Ok(());
        }

        self.client
            .set_i64_with_ttl_ms(&key.to_string(), principal_id, ttl_millis(ttl))
            .await
            .map_err(DomainError::from)
    }

    async fn get(&self, key: &RevocationKey) -> Result<Option<PrincipalId>, DomainError> {
        self.client
            .get_i64(&key.to_string())
            .await
            .map_err(DomainError::from)
    }

    async fn delete(&self, key: &RevocationKey) -> Result<bool, DomainError> {
        self.client
            .delete(&key.to_string())
            .await
            .map_err(DomainError::from)
    }

    async fn track_session(
        &self,
        principal_id: PrincipalId,
        key: &RevocationKey,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Ok(());
        }

        self.client
            .add_member_with_ttl_ms(
                &session_index_key(principal_id),
                &key.to_string(),
                ttl_millis(ttl),
            )
            .await
            .map_err(DomainError::from)
    }

    async fn revoke_sessions(&self, principal_id: PrincipalId) -> Result<usize, DomainError> {
        self.client
            .delete_members(&session_index_key(principal_id))
            .await
            .map_err(DomainError::from)
    }
}
