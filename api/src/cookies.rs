//! Auth cookie construction

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{DateTime, Utc};

use cbt_core::domain::entities::TokenPair;
use cbt_shared::config::CookieConfig;

/// Builds the access and refresh cookies from [`CookieConfig`]
#[derive(Debug, Clone)]
pub struct CookieSettings {
    config: CookieConfig,
}

impl CookieSettings {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn access_name(&self) -> &str {
        &self.config.access_cookie
    }

    pub fn refresh_name(&self) -> &str {
        &self.config.refresh_cookie
    }

    /// Access and refresh cookies for a freshly issued pair
    ///
    /// Both cookies live as long as the refresh token; the gate rotates an
    /// expired access token presented in its cookie.
    pub fn session_cookies(&self, pair: &TokenPair, now: DateTime<Utc>) -> [Cookie<'static>; 2] {
        let max_age = pair.refresh_expires_in(now);
        [
            self.access_cookie(&pair.access_token, max_age),
            self.refresh_cookie(&pair.refresh_token, max_age),
        ]
    }

    pub fn access_cookie(&self, token: &str, max_age_secs: i64) -> Cookie<'static> {
        self.build(self.config.access_cookie.clone(), token.to_string(), max_age_secs)
    }

    pub fn refresh_cookie(&self, token: &str, max_age_secs: i64) -> Cookie<'static> {
        self.build(self.config.refresh_cookie.clone(), token.to_string(), max_age_secs)
    }

    /// Both cookies emptied with a zero max-age
    pub fn cleared(&self) -> [Cookie<'static>; 2] {
        [
            self.build(self.config.access_cookie.clone(), String::new(), 0),
            self.build(self.config.refresh_cookie.clone(), String::new(), 0),
        ]
    }

    fn build(&self, name: String, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build(name, value)
            .path(self.config.path.clone())
            .http_only(self.config.http_only)
            .secure(self.config.secure)
            .same_site(same_site(&self.config.same_site))
            .max_age(CookieDuration::seconds(max_age_secs.max(0)))
            .finish()
    }
}

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
