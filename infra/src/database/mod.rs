//! Database module - MySQL implementations using SQLx
//!
//! This module provides the user store backing the account service:
//! - Connection pool management and migrations
//! - `UserRepository` over the `principals` table

pub mod connection;
pub mod user_repository;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use user_repository::MySqlUserRepository;

pub use cbt_shared::config::DatabaseConfig;
