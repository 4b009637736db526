//! User repository trait defining the interface for principal persistence.
//!
//! The token engine only reads principals. Account services create them and
//! update the last-login timestamp and password digest.

use async_trait::async_trait;

use crate::domain::entities::{Principal, PrincipalId};
use crate::errors::DomainError;

/// Repository trait for Principal persistence operations
///
/// Implementations must provide read-after-write consistency for the same id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a principal by email (case-insensitive)
    ///
    /// # Returns
    /// * `Ok(Some(Principal))` - Principal found
    /// * `Ok(None)` - No principal with the given email
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;

    /// Find a principal by id
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError>;

    /// Persist a new principal and return it with its assigned id
    ///
    /// Fails with `AuthError::EmailAlreadyExists` on a duplicate email.
    async fn create(&self, principal: Principal) -> Result<Principal, DomainError>;

    /// Stamp the last login time
    async fn update_last_login(&self, id: PrincipalId) -> Result<Principal, DomainError>;

    /// Replace the password digest
    async fn update_password_hash(
        &self,
        id: PrincipalId,
        password_hash: &str,
    ) -> Result<Principal, DomainError>;
}
