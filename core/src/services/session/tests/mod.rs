mod manager_tests;

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::clock::ManualClock;
use crate::domain::entities::Principal;
use crate::repositories::revocation::InMemoryRevocationStore;
use crate::services::session::SessionManager;
use crate::services::token::{TokenIssuer, TokenServiceConfig, TokenVerifier};

pub(crate) struct Harness {
    pub sessions: Arc<SessionManager<InMemoryRevocationStore>>,
    pub store: InMemoryRevocationStore,
    pub clock: ManualClock,
}

pub(crate) fn harness() -> Harness {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let config = TokenServiceConfig {
        access_secret: "session-access".to_string(),
        refresh_secret: "session-refresh".to_string(),
        reset_secret: "session-reset".to_string(),
        ..TokenServiceConfig::default()
    };
    let store = InMemoryRevocationStore::with_clock(Arc::new(clock.clone()));
    let sessions = Arc::new(SessionManager::new(
        TokenIssuer::new(config.clone(), Arc::new(clock.clone())),
        TokenVerifier::new(&config, Arc::new(clock.clone())),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
    ));

    Harness {
        sessions,
        store,
        clock,
    }
}

pub(crate) fn principal(id: i64, email: &str) -> Principal {
    let mut principal = Principal::new_user("Test".to_string(), email.to_string(), "digest".to_string());
    principal.id = id;
    principal
}
