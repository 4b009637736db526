mod verifier_tests;

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::clock::ManualClock;
use crate::services::token::{TokenIssuer, TokenServiceConfig, TokenVerifier};

pub(crate) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        reset_secret: "test-reset-secret".to_string(),
        ..TokenServiceConfig::default()
    }
}

pub(crate) fn engine() -> (TokenIssuer, TokenVerifier, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let config = test_config();
    let issuer = TokenIssuer::new(config.clone(), Arc::new(clock.clone()));
    let verifier = TokenVerifier::new(&config, Arc::new(clock.clone()));
    (issuer, verifier, clock)
}
