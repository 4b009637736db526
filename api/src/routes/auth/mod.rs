//! Authentication route handlers
//!
//! The same handlers serve `/api/auth` (users) and `/api/admin` (admins);
//! only registration, login and `me` differ by role.

pub mod login;
pub mod logout;
pub mod me;
pub mod password;
pub mod refresh;
pub mod register;

use std::sync::Arc;

use actix_web::{HttpResponse, HttpResponseBuilder};
use chrono::{DateTime, Utc};

use cbt_core::clock::Clock;
use cbt_core::domain::entities::TokenPair;
use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_core::services::{AuthGate, AuthService, Gatekeeper};
use cbt_shared::config::CookieConfig;
use cbt_shared::{ApiResponse, TokenInfo};

use crate::cookies::CookieSettings;
use crate::middleware::AuthGuard;

/// Application state shared by the auth handlers
pub struct AppState<U, S>
where
    U: UserRepository,
    S: RevocationStore,
{
    pub auth_service: Arc<AuthService<U, S>>,
    pub gate: Arc<dyn Gatekeeper>,
    pub cookies: CookieSettings,
    /// Time source of the session manager, used for cookie lifetimes
    pub clock: Arc<dyn Clock>,
}

impl<U, S> AppState<U, S>
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    /// The gate shares the service's session manager
    pub fn new(auth_service: Arc<AuthService<U, S>>, cookies: CookieConfig) -> Self {
        let gate: Arc<dyn Gatekeeper> = Arc::new(AuthGate::new(Arc::clone(auth_service.sessions())));
        let clock = auth_service.sessions().clock();
        Self {
            auth_service,
            gate,
            cookies: CookieSettings::new(cookies),
            clock,
        }
    }

    /// Middleware guarding protected routes
    pub fn guard(&self) -> AuthGuard {
        AuthGuard::new(
            Arc::clone(&self.gate),
            self.cookies.clone(),
            Arc::clone(&self.clock),
        )
    }
}

/// Response carrying a freshly issued pair: cookies plus the access token in the body
pub(crate) fn session_response<T: serde::Serialize>(
    mut builder: HttpResponseBuilder,
    cookies: &CookieSettings,
    now: DateTime<Utc>,
    message: &str,
    data: T,
    pair: &TokenPair,
) -> HttpResponse {
    let expires_in = pair.access_expires_in(now);

    for cookie in cookies.session_cookies(pair, now) {
        builder.cookie(cookie);
    }
    builder.json(ApiResponse::success(message, data).with_token(TokenInfo {
        access_token: pair.access_token.clone(),
        expires_in,
    }))
}
