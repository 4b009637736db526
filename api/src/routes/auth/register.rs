use actix_web::{web, HttpResponse};

use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_shared::ApiResponse;

use crate::dto::{PrincipalResponse, RegisterRequest};
use crate::handlers::{handle_domain_error, validate_request};

use super::{session_response, AppState};

/// Handler for POST /api/auth/register
///
/// Creates a user and signs them in.
///
/// ## Errors
/// - 400 Bad Request: Validation failure
/// - 409 Conflict: Email already registered
/// - 500 Internal Server Error: Tokens could not be issued or persisted
pub async fn register_user<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    if let Err(response) = validate_request(&*body) {
        return response;
    }

    match state
        .auth_service
        .register_user(&body.full_name, &body.email, &body.password)
        .await
    {
        Ok(grant) => session_response(
            HttpResponse::Created(),
            &state.cookies,
            state.clock.now(),
            "Registration successful",
            PrincipalResponse::from(&grant.principal),
            &grant.tokens,
        ),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/admin/register
///
/// Creates an admin awaiting approval. No credentials are issued.
pub async fn register_admin<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    if let Err(response) = validate_request(&*body) {
        return response;
    }

    match state
        .auth_service
        .register_admin(&body.full_name, &body.email, &body.password)
        .await
    {
        Ok(principal) => HttpResponse::Created().json(ApiResponse::success(
            "Admin registered, awaiting approval",
            PrincipalResponse::from(&principal),
        )),
        Err(error) => handle_domain_error(error),
    }
}
