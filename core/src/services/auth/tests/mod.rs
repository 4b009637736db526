mod last_login_tests;

use std::sync::Arc;
use std::time::Duration;

use crate::repositories::{InMemoryRevocationStore, InMemoryUserRepository};
use crate::services::auth::{AuthService, AuthServiceConfig, BcryptPasswordHasher, OutboxResetLinkSender};
use crate::services::session::tests::{harness, Harness};

pub(crate) struct AuthHarness {
    pub service: AuthService<InMemoryUserRepository, InMemoryRevocationStore>,
    pub users: InMemoryUserRepository,
    pub outbox: OutboxResetLinkSender,
    pub session: Harness,
}

pub(crate) fn auth_harness() -> AuthHarness {
    let session = harness();
    let users = InMemoryUserRepository::new();
    let outbox = OutboxResetLinkSender::new();

    let service = AuthService::new(
        Arc::new(users.clone()),
        Arc::clone(&session.sessions),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        Arc::new(outbox.clone()),
        AuthServiceConfig {
            last_login_timeout: Duration::from_millis(500),
        },
    );

    AuthHarness {
        service,
        users,
        outbox,
        session,
    }
}
