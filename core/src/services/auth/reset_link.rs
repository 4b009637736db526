//! Delivery of password reset links

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::entities::{Principal, ResetToken};
use crate::errors::DomainError;

/// Hands a freshly issued reset token to the principal
#[async_trait]
pub trait ResetLinkSender: Send + Sync {
    async fn send_reset_link(
        &self,
        principal: &Principal,
        reset: &ResetToken,
    ) -> Result<(), DomainError>;
}

/// A reset link captured by [`OutboxResetLinkSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Sender that keeps every link in memory instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct OutboxResetLinkSender {
    messages: Arc<Mutex<Vec<OutboxMessage>>>,
}

impl OutboxResetLinkSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<OutboxMessage> {
        self.messages.lock().await.clone()
    }

    /// Most recent token sent to `email`
    pub async fn last_token_for(&self, email: &str) -> Option<String> {
        self.messages
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.email == email)
            .map(|m| m.token.clone())
    }
}

#[async_trait]
impl ResetLinkSender for OutboxResetLinkSender {
    async fn send_reset_link(
        &self,
        principal: &Principal,
        reset: &ResetToken,
    ) -> Result<(), DomainError> {
        self.messages.lock().await.push(OutboxMessage {
            email: principal.email.clone(),
            token: reset.token.clone(),
            expires_at: reset.expires_at,
        });
        Ok(())
    }
}
