//! In-memory implementation of UserRepository

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entities::{normalize_email, Principal, PrincipalId};
use crate::errors::{AuthError, DomainError};

use super::trait_::UserRepository;

/// User repository holding principals in memory
///
/// Clones share state. Ids are assigned sequentially starting at 1.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<PrincipalId, Principal>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Set the approval flag of a principal
    pub async fn set_approved(&self, id: PrincipalId, approved: bool) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(not_found)?;
        user.is_approved = approved;
        user.updated_at = Utc::now();
        Ok(())
    }

    /// Number of stored principals
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found() -> DomainError {
    DomainError::NotFound {
        resource: "User".to_string(),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, mut principal: Principal) -> Result<Principal, DomainError> {
        let mut users = self.users.write().await;

        principal.email = normalize_email(&principal.email);
        if users.values().any(|u| u.email == principal.email) {
            return Err(AuthError::EmailAlreadyExists.into());
        }

        principal.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        users.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn update_last_login(&self, id: PrincipalId) -> Result<Principal, DomainError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(not_found)?;
        user.touch_last_login(Utc::now());
        Ok(user.clone())
    }

    async fn update_password_hash(
        &self,
        id: PrincipalId,
        password_hash: &str,
    ) -> Result<Principal, DomainError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(not_found)?;
        user.set_password_hash(password_hash.to_string(), Utc::now());
        Ok(user.clone())
    }
}
