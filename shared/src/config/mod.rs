//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Signing secrets, token lifetimes and auth cookies
//! - `cache` - Redis configuration for the revocation registry
//! - `database` - User store connection settings
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//!
//! Configuration is read once at startup and injected from there on.

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AuthConfig, CookieConfig, JwtConfig, LastLoginConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

/// Errors raised while validating configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing secret: {name}")]
    MissingSecret { name: &'static str },

    #[error("Secrets {first} and {second} must differ")]
    SharedSecret {
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid lifetime for {name}: {seconds}s")]
    InvalidLifetime { name: &'static str, seconds: i64 },

    #[error("Development signing secrets are not allowed in {environment}")]
    DevelopmentSecret { environment: Environment },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut auth = AuthConfig::from_env();
        if environment.is_production() {
            auth.cookies.secure = true;
        }

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth,
            cache: CacheConfig::from_env(),
            cors: CorsConfig::from_env(environment),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Validate the parts of the configuration that must hold before serving
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.jwt.validate()
    }
}
