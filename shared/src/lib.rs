//! Shared configuration and common types for the CBT backend
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (JWT secrets, cookies, Redis, database, server)
//! - The API response envelope returned by every endpoint

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, CookieConfig, CorsConfig, DatabaseConfig,
    Environment, JwtConfig, LastLoginConfig, LoggingConfig, ServerConfig,
};
pub use types::response::{ApiResponse, FieldError, TokenInfo};
