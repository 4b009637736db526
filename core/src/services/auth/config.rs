//! Configuration for the account service

use std::time::Duration;

use cbt_shared::config::AuthConfig;

/// Configuration for the account service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Upper bound for the detached last-login write
    pub last_login_timeout: Duration,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            last_login_timeout: Duration::from_secs(2),
        }
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            last_login_timeout: Duration::from_millis(config.last_login.timeout_ms),
        }
    }
}
