use actix_web::{web, HttpRequest, HttpResponse};

use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_shared::ApiResponse;

use crate::dto::RefreshTokenRequest;
use crate::handlers::handle_domain_error;
use crate::middleware::auth::{access_credential, refresh_credential};

use super::AppState;

/// Handler for POST /api/{auth,admin}/logout
///
/// Revokes whatever credentials are presented, expired ones included, and
/// clears the cookies. Calling it again is harmless.
///
/// ## Errors
/// - 503 Service Unavailable: Revocation store unreachable
pub async fn logout<U, S>(
    req: HttpRequest,
    state: web::Data<AppState<U, S>>,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    let access = access_credential(&req, &state.cookies);
    let refresh = body
        .and_then(|b| b.into_inner().refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| refresh_credential(&req, &state.cookies));

    match state
        .auth_service
        .logout(access.as_deref(), refresh.as_deref())
        .await
    {
        Ok(()) => {
            let mut response = HttpResponse::Ok();
            for cookie in state.cookies.cleared() {
                response.cookie(cookie);
            }
            response.json(ApiResponse::message("Logged out successfully"))
        }
        Err(error) => handle_domain_error(error),
    }
}
