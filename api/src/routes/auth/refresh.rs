use actix_web::{web, HttpRequest, HttpResponse};

use cbt_core::repositories::{RevocationStore, UserRepository};

use crate::dto::{RefreshTokenRequest, SessionResponse};
use crate::handlers::{handle_domain_error, unauthorized};
use crate::middleware::auth::refresh_credential;

use super::{session_response, AppState};

/// Handler for POST /api/{auth,admin}/refresh
///
/// Exchanges a refresh token for a new pair. The token is taken from the
/// JSON body, else the refresh cookie, else the `X-Refresh-Token` header.
/// A refresh token can be exchanged once.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or already used token
/// - 503 Service Unavailable: Revocation store unreachable
pub async fn refresh<U, S>(
    req: HttpRequest,
    state: web::Data<AppState<U, S>>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    let from_body = body.and_then(|b| b.into_inner().refresh_token);
    let Some(refresh_token) = from_body
        .filter(|t| !t.is_empty())
        .or_else(|| refresh_credential(&req, &state.cookies))
    else {
        return unauthorized();
    };

    match state.auth_service.refresh(&refresh_token).await {
        Ok(rotation) => session_response(
            HttpResponse::Ok(),
            &state.cookies,
            state.clock.now(),
            "Token refreshed",
            SessionResponse {
                principal_id: rotation.principal_id,
                email: rotation.email.clone(),
            },
            &rotation.pair,
        ),
        Err(error) => handle_domain_error(error),
    }
}
