//! Auth gate middleware for protected endpoints.
//!
//! Extracts the access credential (cookie first, then `Authorization: Bearer`)
//! and the refresh credential (cookie first, then `X-Refresh-Token`), hands
//! them to the [`Gatekeeper`] and either rejects the request or lets it through
//! with an [`AuthContext`] in the request extensions. When the gate rotated
//! an expired session, the new pair is returned on the same response as
//! `X-New-Access-Token` / `X-New-Refresh-Token` headers and as fresh cookies.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::{HeaderName, HeaderValue, AUTHORIZATION},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;

use cbt_core::clock::Clock;
use cbt_core::domain::entities::{PrincipalId, TokenPair};
use cbt_core::domain::value_objects::Identity;
use cbt_core::services::{GateVerdict, Gatekeeper, PresentedCredentials};

use crate::cookies::CookieSettings;
use crate::handlers::error::{handle_token_error, unauthorized};

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
pub const NEW_ACCESS_TOKEN_HEADER: &str = "x-new-access-token";
pub const NEW_REFRESH_TOKEN_HEADER: &str = "x-new-refresh-token";

/// Authenticated principal injected into requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: PrincipalId,
    pub email: String,
    /// JTI of the access token the request is served under
    pub access_jti: String,
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self {
            principal_id: identity.principal_id,
            email: identity.email,
            access_jti: identity.access_jti,
        }
    }
}

/// Auth gate middleware factory
#[derive(Clone)]
pub struct AuthGuard {
    gate: Arc<dyn Gatekeeper>,
    cookies: CookieSettings,
    clock: Arc<dyn Clock>,
}

impl AuthGuard {
    pub fn new(gate: Arc<dyn Gatekeeper>, cookies: CookieSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate,
            cookies,
            clock,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service: Rc::new(service),
            gate: Arc::clone(&self.gate),
            cookies: self.cookies.clone(),
            clock: Arc::clone(&self.clock),
        }))
    }
}

/// Auth gate middleware service
pub struct AuthGuardMiddleware<S> {
    service: Rc<S>,
    gate: Arc<dyn Gatekeeper>,
    cookies: CookieSettings,
    clock: Arc<dyn Clock>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = Arc::clone(&self.gate);
        let cookies = self.cookies.clone();
        let clock = Arc::clone(&self.clock);

        Box::pin(async move {
            let credentials = PresentedCredentials::new(
                access_credential(req.request(), &cookies),
                refresh_credential(req.request(), &cookies),
            );

            match gate.evaluate(credentials).await {
                Ok(GateVerdict::Authorized { identity, rotated }) => {
                    req.extensions_mut().insert(AuthContext::from(identity));

                    let mut res = service.call(req).await?;
                    if let Some(pair) = rotated {
                        attach_rotated_pair(&mut res, &pair, &cookies, clock.now());
                    }
                    Ok(res.map_into_left_body())
                }
                Ok(GateVerdict::Unauthorized { reason }) => {
                    tracing::debug!(kind = reason.kind(), path = %req.path(), "Auth gate rejected request");
                    Ok(req.into_response(unauthorized()).map_into_right_body())
                }
                Err(error) => {
                    Ok(req.into_response(handle_token_error(error)).map_into_right_body())
                }
            }
        })
    }
}

fn attach_rotated_pair<B>(
    res: &mut ServiceResponse<B>,
    pair: &TokenPair,
    cookies: &CookieSettings,
    now: DateTime<Utc>,
) {
    for (name, value) in [
        (NEW_ACCESS_TOKEN_HEADER, &pair.access_token),
        (NEW_REFRESH_TOKEN_HEADER, &pair.refresh_token),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            res.headers_mut().insert(HeaderName::from_static(name), value);
        }
    }

    let response = res.response_mut();
    for cookie in cookies.session_cookies(pair, now) {
        if let Err(e) = response.add_cookie(&cookie) {
            tracing::warn!(error = %e, "Failed to attach rotated credential cookie");
        }
    }
}

/// Access token from the access cookie, else the Bearer header
pub fn access_credential(req: &HttpRequest, cookies: &CookieSettings) -> Option<String> {
    cookie_value(req, cookies.access_name()).or_else(|| bearer_token(req))
}

/// Refresh token from the refresh cookie, else the `X-Refresh-Token` header
pub fn refresh_credential(req: &HttpRequest, cookies: &CookieSettings) -> Option<String> {
    cookie_value(req, cookies.refresh_name()).or_else(|| {
        req.headers()
            .get(REFRESH_TOKEN_HEADER)?
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

fn cookie_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.cookie(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Extracts Bearer token from Authorization header
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Unauthorized"));

        ready(result)
    }
}
