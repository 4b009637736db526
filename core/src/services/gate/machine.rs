//! Auth gate state machine

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{TokenKind, TokenPair};
use crate::domain::value_objects::Identity;
use crate::errors::TokenError;
use crate::repositories::revocation::RevocationStore;
use crate::services::session::SessionManager;

/// Credentials extracted from one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedCredentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl PresentedCredentials {
    pub fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self { access, refresh }
    }
}

/// Outcome of evaluating a request's credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// The request may proceed as `identity`. `rotated` carries a fresh pair
    /// when the access token had expired and the refresh token was exchanged.
    Authorized {
        identity: Identity,
        rotated: Option<TokenPair>,
    },
    /// The request must be rejected. `reason` is for logs only.
    Unauthorized { reason: TokenError },
}

impl GateVerdict {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateVerdict::Authorized { .. })
    }
}

/// Seam between the transport middleware and the gate
#[async_trait]
pub trait Gatekeeper: Send + Sync {
    /// Evaluates the credentials of one request
    ///
    /// `Err` is reserved for infrastructure faults, which must surface as a
    /// server error rather than as Unauthorized.
    async fn evaluate(&self, credentials: PresentedCredentials) -> Result<GateVerdict, TokenError>;
}

/// Auth gate backed by a [`SessionManager`]
///
/// An expired access token triggers exactly one rotation attempt. Every other
/// failure is terminal.
pub struct AuthGate<S: RevocationStore> {
    sessions: Arc<SessionManager<S>>,
}

impl<S: RevocationStore + 'static> AuthGate<S> {
    pub fn new(sessions: Arc<SessionManager<S>>) -> Self {
        Self { sessions }
    }

    async fn attempt_rotation(
        &self,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<GateVerdict, TokenError> {
        let Some(refresh) = refresh else {
            tracing::debug!("Access token expired and no refresh token presented");
            return Ok(unauthorized(TokenError::ExpiredToken));
        };

        // Signature was already proven; only expiry failed
        let expired = match self
            .sessions
            .verifier()
            .decode_ignoring_expiry(access, TokenKind::Access)
        {
            Ok(claims) => claims,
            Err(e) => return Ok(unauthorized(e)),
        };

        match self.sessions.rotate_for(refresh, Some(expired.user_id)).await {
            Ok(rotation) => Ok(GateVerdict::Authorized {
                identity: rotation.identity(),
                rotated: Some(rotation.pair),
            }),
            Err(e) if e.is_infrastructure() => Err(e),
            Err(e) => {
                tracing::debug!(
                    principal_id = expired.user_id,
                    reason = e.kind(),
                    "Silent rotation refused"
                );
                Ok(unauthorized(e))
            }
        }
    }
}

fn unauthorized(reason: TokenError) -> GateVerdict {
    GateVerdict::Unauthorized { reason }
}

#[async_trait]
impl<S: RevocationStore + 'static> Gatekeeper for AuthGate<S> {
    async fn evaluate(&self, credentials: PresentedCredentials) -> Result<GateVerdict, TokenError> {
        let Some(access) = credentials.access.as_deref() else {
            return Ok(unauthorized(TokenError::MalformedCredential));
        };

        match self.sessions.authenticate(access).await {
            Ok(identity) => Ok(GateVerdict::Authorized {
                identity,
                rotated: None,
            }),
            Err(TokenError::ExpiredToken) => {
                self.attempt_rotation(access, credentials.refresh.as_deref())
                    .await
            }
            Err(e) if e.is_infrastructure() => Err(e),
            Err(e) => {
                tracing::debug!(reason = e.kind(), "Access token rejected");
                Ok(unauthorized(e))
            }
        }
    }
}
