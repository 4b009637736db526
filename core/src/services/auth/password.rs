//! Password hashing

use crate::errors::{AuthError, DomainError};

/// One-way password hash and compare
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash(&self, plaintext: &str) -> Result<String, DomainError>;

    /// Compare a plaintext password with a stored digest
    fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, DomainError>;
}

/// bcrypt-based hasher
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Lower costs are only meant for tests
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, DomainError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            DomainError::Auth(AuthError::PasswordHashFailed)
        })
    }

    fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, DomainError> {
        match bcrypt::verify(plaintext, digest) {
            Ok(matches) => Ok(matches),
            Err(e) => {
                // A corrupt digest can never match
                tracing::warn!(error = %e, "Stored password digest could not be parsed");
                Ok(false)
            }
        }
    }
}
