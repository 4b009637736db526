use actix_web::{web, HttpResponse};

use cbt_core::repositories::{RevocationStore, UserRepository};

use crate::dto::{LoginRequest, PrincipalResponse};
use crate::handlers::{handle_domain_error, validate_request};

use super::{session_response, AppState};

/// Handler for POST /api/auth/login
///
/// ## Errors
/// - 400 Bad Request: Validation failure or invalid email/password
/// - 500 Internal Server Error: Tokens could not be issued or persisted
pub async fn login_user<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    if let Err(response) = validate_request(&*body) {
        return response;
    }

    match state.auth_service.login_user(&body.email, &body.password).await {
        Ok(grant) => session_response(
            HttpResponse::Ok(),
            &state.cookies,
            state.clock.now(),
            "Login successful",
            PrincipalResponse::from(&grant.principal),
            &grant.tokens,
        ),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/admin/login
///
/// Same as user login; additionally answers 400 while the admin is pending approval.
pub async fn login_admin<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    if let Err(response) = validate_request(&*body) {
        return response;
    }

    match state.auth_service.login_admin(&body.email, &body.password).await {
        Ok(grant) => session_response(
            HttpResponse::Ok(),
            &state.cookies,
            state.clock.now(),
            "Login successful",
            PrincipalResponse::from(&grant.principal),
            &grant.tokens,
        ),
        Err(error) => handle_domain_error(error),
    }
}
