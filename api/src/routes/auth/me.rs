use actix_web::{web, HttpResponse};

use cbt_core::domain::entities::Role;
use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_shared::ApiResponse;

use crate::dto::PrincipalResponse;
use crate::handlers::{forbidden, handle_domain_error};
use crate::middleware::AuthContext;

use super::AppState;

/// Handler for GET /api/auth/me (behind the auth gate)
pub async fn me<U, S>(state: web::Data<AppState<U, S>>, auth: AuthContext) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    match state.auth_service.current_principal(auth.principal_id).await {
        Ok(principal) => HttpResponse::Ok().json(ApiResponse::success(
            "Current principal",
            PrincipalResponse::from(&principal),
        )),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for GET /api/admin/me (behind the auth gate)
///
/// A valid session of a non-admin principal gets 403.
pub async fn me_admin<U, S>(state: web::Data<AppState<U, S>>, auth: AuthContext) -> HttpResponse
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    match state.auth_service.current_principal(auth.principal_id).await {
        Ok(principal) if principal.role == Role::Admin => HttpResponse::Ok().json(
            ApiResponse::success("Current admin", PrincipalResponse::from(&principal)),
        ),
        Ok(principal) => {
            tracing::info!(principal_id = principal.id, "Non-admin principal on admin route");
            forbidden()
        }
        Err(error) => handle_domain_error(error),
    }
}
