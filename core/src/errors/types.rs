//! Error types for credential handling and account operations
//!
//! Messages here are for logs. The presentation layer decides what the caller
//! sees, and token failures are always collapsed into one generic response.

use thiserror::Error;

/// Token-related errors
///
/// `MalformedCredential`, `InvalidSignature` and `RevokedOrUnknownToken` are
/// terminal for a request. `ExpiredToken` on an access token allows exactly one
/// rotation attempt. The remaining variants are infrastructure faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed credential")]
    MalformedCredential,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token revoked or unknown")]
    RevokedOrUnknownToken,

    #[error("Revocation store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Token signing failed: {message}")]
    SigningFailure { message: String },

    #[error("Failed to persist issued tokens: {message}")]
    PersistFailed { message: String },
}

impl TokenError {
    /// Short machine-readable kind for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MalformedCredential => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::ExpiredToken => "expired",
            TokenError::RevokedOrUnknownToken => "revoked",
            TokenError::StoreUnavailable { .. } => "store_unavailable",
            TokenError::SigningFailure { .. } => "signing_failure",
            TokenError::PersistFailed { .. } => "persist_failed",
        }
    }

    /// Faults that must surface as a server error, never as Unauthorized
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            TokenError::StoreUnavailable { .. }
                | TokenError::SigningFailure { .. }
                | TokenError::PersistFailed { .. }
        )
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::ExpiredToken)
    }
}

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Account awaiting approval")]
    AccountNotApproved,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing failed")]
    PasswordHashFailed,
}
