//! Process configuration for the API binary
//!
//! Environment files are read once here; everything downstream receives the
//! resulting `Config` by value.

use std::env;

use cbt_shared::config::{AppConfig, ConfigError, Environment, JwtConfig};

const DEFAULT_RESET_LINK_BASE_URL: &str = "http://localhost:3000/reset-password";

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Frontend page that accepts password reset tokens
    pub reset_link_base_url: String,
}

impl Config {
    /// Load `.env` files and the environment, then validate
    ///
    /// Production refuses to start on invalid or development secrets.
    /// Other environments log a warning and fall back to development secrets.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        dotenvy::from_filename(environment.env_file()).ok();
        dotenvy::dotenv().ok();

        let app = resolve(AppConfig::from_env())?;
        let reset_link_base_url = env::var("RESET_LINK_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_RESET_LINK_BASE_URL.to_string());

        Ok(Self {
            app,
            reset_link_base_url,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment.is_production()
    }
}

/// Apply the environment's policy to a loaded configuration
pub fn resolve(mut app: AppConfig) -> Result<AppConfig, ConfigError> {
    let environment = app.environment;

    match app.validate() {
        Ok(()) if environment.is_production() && app.auth.jwt.is_using_default_secret() => {
            Err(ConfigError::DevelopmentSecret { environment })
        }
        Ok(()) => {
            if app.auth.jwt.is_using_default_secret() {
                tracing::warn!(%environment, "Using development signing secrets");
            }
            Ok(app)
        }
        Err(error) if environment.is_production() => Err(error),
        Err(error) => {
            tracing::warn!(%environment, %error, "Invalid JWT configuration, using development secrets");
            let defaults = JwtConfig::default();
            app.auth.jwt.access_secret = defaults.access_secret.clone();
            app.auth.jwt.refresh_secret = defaults.refresh_secret.clone();
            app.auth.jwt.reset_secret = defaults.reset_secret.clone();
            if app.auth.jwt.validate().is_err() {
                app.auth.jwt = defaults;
            }
            Ok(app)
        }
    }
}
