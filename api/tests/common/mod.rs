//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::{body::MessageBody, dev::ServiceResponse, http::header, test, web};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use cbt_api::AppState;
use cbt_core::{
    AuthService, AuthServiceConfig, BcryptPasswordHasher, InMemoryRevocationStore,
    InMemoryUserRepository, ManualClock, OutboxResetLinkSender, RevocationKey, SessionManager,
    TokenIssuer, TokenKind, TokenServiceConfig, TokenVerifier,
};
use cbt_shared::config::CookieConfig;

pub type State = AppState<InMemoryUserRepository, InMemoryRevocationStore>;

pub struct TestContext {
    pub state: web::Data<State>,
    pub users: InMemoryUserRepository,
    pub store: InMemoryRevocationStore,
    pub outbox: OutboxResetLinkSender,
    pub clock: ManualClock,
    pub sessions: Arc<SessionManager<InMemoryRevocationStore>>,
}

impl TestContext {
    /// Whether the store still trusts the refresh token
    pub async fn refresh_is_live(&self, refresh_token: &str) -> bool {
        let claims = self
            .sessions
            .verifier()
            .decode_ignoring_expiry(refresh_token, TokenKind::Refresh)
            .expect("refresh token should decode");
        self.store.contains(&RevocationKey::refresh(claims.jti)).await
    }

    /// Whether the store still trusts the access token
    pub async fn access_is_live(&self, access_token: &str) -> bool {
        let claims = self
            .sessions
            .verifier()
            .decode_ignoring_expiry(access_token, TokenKind::Access)
            .expect("access token should decode");
        self.store.contains(&RevocationKey::access(claims.jti)).await
    }
}

pub fn context() -> TestContext {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let config = TokenServiceConfig {
        access_secret: "api-access-secret".to_string(),
        refresh_secret: "api-refresh-secret".to_string(),
        reset_secret: "api-reset-secret".to_string(),
        ..TokenServiceConfig::default()
    };

    let store = InMemoryRevocationStore::with_clock(Arc::new(clock.clone()));
    let users = InMemoryUserRepository::new();
    let outbox = OutboxResetLinkSender::new();

    let sessions = Arc::new(SessionManager::new(
        TokenIssuer::new(config.clone(), Arc::new(clock.clone())),
        TokenVerifier::new(&config, Arc::new(clock.clone())),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
    ));
    let service = AuthService::new(
        Arc::new(users.clone()),
        Arc::clone(&sessions),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        Arc::new(outbox.clone()),
        AuthServiceConfig {
            last_login_timeout: Duration::from_millis(500),
        },
    );

    TestContext {
        state: web::Data::new(AppState::new(Arc::new(service), CookieConfig::default())),
        users,
        store,
        outbox,
        clock,
        sessions,
    }
}

/// Credentials issued by a login-like response
pub struct Issued {
    pub status: u16,
    pub access_token: String,
    pub refresh_token: String,
    pub body: Value,
}

/// Read the access token from the body and the refresh token from its cookie
pub async fn issued<B: MessageBody>(resp: ServiceResponse<B>) -> Issued {
    let status = resp.status().as_u16();
    let refresh_token = cookie_value(&resp, "refresh_token").unwrap_or_default();
    let body: Value = test::read_body_json(resp).await;
    let access_token = body["token"]["access_token"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    Issued {
        status,
        access_token,
        refresh_token,
        body,
    }
}

pub fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

pub fn cookie_max_age<B>(resp: &ServiceResponse<B>, name: &str) -> Option<i64> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .and_then(|c| c.max_age())
        .map(|age| age.whole_seconds())
}

pub fn header_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn register_body(email: &str, password: &str) -> Value {
    json!({
        "full_name": "Test Person",
        "email": email,
        "password": password,
    })
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
