use actix_web::{web, HttpResponse};

use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_shared::ApiResponse;

use crate::dto::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::handlers::{handle_domain_error, validate_request};

use super::AppState;

const RESET_LINK_SENT: &str = "If the email is registered, a reset link has been sent";

/// Handler for POST /api/{auth,admin}/forgot-password
///
/// Answers the same way whether or not the email is registered.
pub async fn forgot_password<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<ForgotPasswordRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    if let Err(response) = validate_request(&*body) {
        return response;
    }

    match state.auth_service.forgot_password(&body.email).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::message(RESET_LINK_SENT)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/{auth,admin}/reset-password
///
/// ## Errors
/// - 400 Bad Request: Validation failure
/// - 401 Unauthorized: Reset token invalid, expired or already used
pub async fn reset_password<U, S>(
    state: web::Data<AppState<U, S>>,
    body: web::Json<ResetPasswordRequest>,
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
        .reset_password(&body.token, &body.password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::message("Password has been reset")),
        Err(error) => handle_domain_error(error),
    }
}
