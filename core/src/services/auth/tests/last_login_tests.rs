//! Unit tests for the detached last-login recorder

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{Principal, PrincipalId};
use crate::errors::DomainError;
use crate::repositories::{InMemoryUserRepository, UserRepository};
use crate::services::auth::LastLoginRecorder;

/// Repository whose last-login write never finishes in time
struct SlowUserRepository;

#[async_trait]
impl UserRepository for SlowUserRepository {
    async fn find_by_email(&self, _email: &str) -> Result<Option<Principal>, DomainError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        Ok(None)
    }

    async fn create(&self, principal: Principal) -> Result<Principal, DomainError> {
        Ok(principal)
    }

    async fn update_last_login(&self, _id: PrincipalId) -> Result<Principal, DomainError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(DomainError::internal("unreachable"))
    }

    async fn update_password_hash(
        &self,
        _id: PrincipalId,
        _password_hash: &str,
    ) -> Result<Principal, DomainError> {
        Err(DomainError::internal("unsupported"))
    }
}

#[tokio::test]
async fn test_successful_update() {
    let users = InMemoryUserRepository::new();
    let created = users
        .create(Principal::new_user(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "digest".to_string(),
        ))
        .await
        .unwrap();
    let recorder = LastLoginRecorder::new(Duration::from_secs(1));

    recorder
        .record(Arc::new(users.clone()), created.id)
        .await
        .unwrap();

    let reloaded = users.find_by_id(created.id).await.unwrap().unwrap();
    assert!(reloaded.last_login_at.is_some());
    assert_eq!(recorder.failures(), 0);
}

#[tokio::test]
async fn test_missing_principal_counts_as_failure() {
    let recorder = LastLoginRecorder::new(Duration::from_secs(1));

    recorder
        .record(Arc::new(InMemoryUserRepository::new()), 404)
        .await
        .unwrap();

    assert_eq!(recorder.failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_update_times_out() {
    let recorder = LastLoginRecorder::new(Duration::from_millis(50));

    recorder.record(Arc::new(SlowUserRepository), 1).await.unwrap();

    assert_eq!(recorder.failures(), 1);
}
