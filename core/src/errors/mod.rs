//! Domain-specific error types and error handling.

mod types;


pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Revocation store outage
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        DomainError::Token(TokenError::StoreUnavailable {
            message: message.into(),
        })
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Whether the error is a server-side fault (5xx class)
    pub fn is_infrastructure(&self) -> bool {
        match self {
            DomainError::Internal { .. } => true,
            DomainError::Auth(AuthError::PasswordHashFailed) => true,
            DomainError::Token(e) => e.is_infrastructure(),
            _ => false,
        }
    }
}

impl From<DomainError> for TokenError {
    /// Token errors pass through; anything else becomes `StoreUnavailable`,
    /// never an authorization failure.
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Token(e) => e,
            other => TokenError::StoreUnavailable {
                message: other.to_string(),
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
