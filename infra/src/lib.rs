//! # Infrastructure Layer
//!
//! Concrete implementations of the repository and delivery interfaces
//! defined in `cbt_core`:
//! - **Cache**: Redis client and the Redis-backed revocation store
//! - **Database**: MySQL user store using SQLx
//! - **Notifications**: reset link delivery
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use cbt_core::errors::DomainError;

/// Cache module - Redis client and revocation registry
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Outbound notifications
pub mod notifications;

pub use cache::{RedisClient, RedisRevocationStore};
#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlUserRepository};
pub use notifications::TracingResetLinkSender;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A single round-trip exceeded its deadline
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(_) | InfrastructureError::Timeout { .. } => {
                DomainError::store_unavailable(err.to_string())
            }
            other => DomainError::internal(other.to_string()),
        }
    }
}
