//! Reset link delivery
//!
//! Mail delivery is handled outside this service. The sender here records
//! that a link was issued, with the recipient and expiry, and never writes
//! the token itself to the log.

use async_trait::async_trait;

use cbt_core::domain::entities::{Principal, ResetToken};
use cbt_core::errors::DomainError;
use cbt_core::services::ResetLinkSender;

/// Reset link sender that emits a structured log event per issued link
#[derive(Debug, Clone)]
pub struct TracingResetLinkSender {
    base_url: String,
}

impl TracingResetLinkSender {
    /// `base_url` is the frontend page that accepts the token
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Link handed to the recipient
    pub fn link_for(&self, reset: &ResetToken) -> String {
        format!(
            "{}?token={}",
            self.base_url.trim_end_matches('/'),
            reset.token
        )
    }
}

#[async_trait]
impl ResetLinkSender for TracingResetLinkSender {
    async fn send_reset_link(
        &self,
        principal: &Principal,
        reset: &ResetToken,
    ) -> Result<(), DomainError> {
        tracing::info!(
            principal_id = principal.id,
            email = %principal.email,
            jti = %reset.jti,
            expires_at = %reset.expires_at,
            base_url = %self.base_url,
            "Password reset link dispatched"
        );
        Ok(())
    }
}
