//! Authentication configuration: signing secrets, token lifetimes and cookies

use serde::{Deserialize, Serialize};

use super::ConfigError;

const DEV_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";
const DEV_RESET_SECRET: &str = "development-reset-secret-change-in-production";

/// JWT signing configuration
///
/// Each token class is signed with its own secret so that a leaked secret
/// cannot be used to forge tokens of another class.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for access tokens
    pub access_secret: String,

    /// Secret for refresh tokens
    pub refresh_secret: String,

    /// Secret for password reset tokens
    pub reset_secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Reset token lifetime in seconds
    pub reset_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"***")
            .field("refresh_secret", &"***")
            .field("reset_secret", &"***")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("reset_token_expiry", &self.reset_token_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEV_ACCESS_SECRET),
            refresh_secret: String::from(DEV_REFRESH_SECRET),
            reset_secret: String::from(DEV_RESET_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            reset_token_expiry: 900,      // 15 minutes
            issuer: String::from("cbt-backend"),
            audience: String::from("cbt-users"),
        }
    }
}

impl JwtConfig {
    /// Create a configuration with explicit secrets and default lifetimes
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        reset_secret: impl Into<String>,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            reset_secret: reset_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Set reset token expiry in minutes
    pub fn with_reset_expiry_minutes(mut self, minutes: i64) -> Self {
        self.reset_token_expiry = minutes * 60;
        self
    }

    /// Check if any of the development secrets is still in use
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEV_ACCESS_SECRET
            || self.refresh_secret == DEV_REFRESH_SECRET
            || self.reset_secret == DEV_RESET_SECRET
    }

    /// Validate secrets and lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secrets = [
            ("ACCESS_TOKEN_SECRET", &self.access_secret),
            ("REFRESH_TOKEN_SECRET", &self.refresh_secret),
            ("RESET_PASSWORD_SECRET", &self.reset_secret),
        ];

        for &(name, secret) in secrets.iter() {
            if secret.is_empty() {
                return Err(ConfigError::MissingSecret { name });
            }
        }

        for (i, &(first, a)) in secrets.iter().enumerate() {
            for &(second, b) in secrets.iter().skip(i + 1) {
                if a == b {
                    return Err(ConfigError::SharedSecret { first, second });
                }
            }
        }

        let lifetimes = [
            ("JWT_ACCESS_TOKEN_EXPIRY", self.access_token_expiry),
            ("JWT_REFRESH_TOKEN_EXPIRY", self.refresh_token_expiry),
            ("JWT_RESET_TOKEN_EXPIRY", self.reset_token_expiry),
        ];
        for (name, seconds) in lifetimes {
            if seconds <= 0 {
                return Err(ConfigError::InvalidLifetime { name, seconds });
            }
        }

        Ok(())
    }
}

/// Cookie settings for the access and refresh credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Name of the access token cookie
    pub access_cookie: String,

    /// Name of the refresh token cookie
    pub refresh_cookie: String,

    /// Cookie path
    pub path: String,

    /// Secure flag (HTTPS only)
    pub secure: bool,

    /// SameSite attribute
    pub same_site: String,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie: String::from("access_token"),
            refresh_cookie: String::from("refresh_token"),
            path: String::from("/"),
            secure: false, // Set to true in production
            same_site: String::from("Lax"),
            http_only: default_http_only(),
        }
    }
}

/// Settings for the detached last-login update
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LastLoginConfig {
    /// Upper bound for the background write, in milliseconds
    pub timeout_ms: u64,
}

impl Default for LastLoginConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Last-login background update
    #[serde(default)]
    pub last_login: LastLoginConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            access_secret: env_or("ACCESS_TOKEN_SECRET", defaults.access_secret),
            refresh_secret: env_or("REFRESH_TOKEN_SECRET", defaults.refresh_secret),
            reset_secret: env_or("RESET_PASSWORD_SECRET", defaults.reset_secret),
            access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_parse(
                "JWT_REFRESH_TOKEN_EXPIRY",
                defaults.refresh_token_expiry,
            ),
            reset_token_expiry: env_parse("JWT_RESET_TOKEN_EXPIRY", defaults.reset_token_expiry),
            issuer: env_or("JWT_ISSUER", defaults.issuer),
            audience: env_or("JWT_AUDIENCE", defaults.audience),
        };

        let last_login = LastLoginConfig {
            timeout_ms: env_parse("LAST_LOGIN_TIMEOUT_MS", LastLoginConfig::default().timeout_ms),
        };

        Self {
            jwt,
            cookies: CookieConfig {
                secure: env_parse("COOKIE_SECURE", false),
                ..Default::default()
            },
            last_login,
        }
    }
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

fn default_http_only() -> bool {
    true
}
