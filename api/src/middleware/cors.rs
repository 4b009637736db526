//! CORS middleware configuration for cross-origin requests.
//!
//! Browsers send the auth cookies with credentials, so origins are listed
//! explicitly whenever `ALLOWED_ORIGINS` is set. The rotated-credential
//! headers are exposed so script clients can pick them up.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use cbt_shared::config::CorsConfig;

use super::auth::{NEW_ACCESS_TOKEN_HEADER, NEW_REFRESH_TOKEN_HEADER, REFRESH_TOKEN_HEADER};

/// Creates a CORS middleware instance from configuration.
///
/// An empty origin list allows any origin (development only; production
/// configuration always carries at least one origin).
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(REFRESH_TOKEN_HEADER),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static(NEW_ACCESS_TOKEN_HEADER),
            header::HeaderName::from_static(NEW_REFRESH_TOKEN_HEADER),
        ])
        .max_age(config.max_age)
        .supports_credentials();

    if config.allowed_origins.is_empty() {
        tracing::info!("Configuring CORS to allow any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            tracing::info!("Adding allowed origin: {}", origin);
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
