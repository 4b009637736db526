//! Domain error to HTTP response mapping
//!
//! Every credential failure becomes the same 401 body. Infrastructure faults
//! are 5xx and never look like an expired session. The precise kind is only
//! written to the log.

use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use validator::{Validate, ValidationErrors};

use cbt_core::errors::{AuthError, DomainError, TokenError};
use cbt_shared::{ApiResponse, FieldError};

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Token(token) => match token {
            TokenError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TokenError::SigningFailure { .. } | TokenError::PersistFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TokenError::MalformedCredential
            | TokenError::InvalidSignature
            | TokenError::ExpiredToken
            | TokenError::RevokedOrUnknownToken => StatusCode::UNAUTHORIZED,
        },
        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials | AuthError::AccountNotApproved => StatusCode::BAD_REQUEST,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::PasswordHashFailed => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to the caller; never includes internal detail
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::Token(TokenError::StoreUnavailable { .. }) => {
            "Service temporarily unavailable".to_string()
        }
        DomainError::Token(token) if !token.is_infrastructure() => UNAUTHORIZED_MESSAGE.to_string(),
        DomainError::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_string(),
        DomainError::Auth(AuthError::AccountNotApproved) => {
            "Account is pending approval".to_string()
        }
        DomainError::Auth(AuthError::EmailAlreadyExists) => "Email is already registered".to_string(),
        DomainError::Auth(AuthError::UserNotFound) => "User not found".to_string(),
        DomainError::Validation { message } => message.clone(),
        DomainError::NotFound { resource } => format!("{} not found", resource),
        _ => "Internal server error".to_string(),
    }
}

/// Convert a domain error into an HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "Request failed");
    } else if let DomainError::Token(token) = &error {
        tracing::debug!(kind = token.kind(), "Credential rejected");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "Request rejected");
    }

    HttpResponse::build(status).json(ApiResponse::error(public_message(&error)))
}

/// Convert a token error into an HTTP response
pub fn handle_token_error(error: TokenError) -> HttpResponse {
    handle_domain_error(DomainError::Token(error))
}

/// The uniform 401 response
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error(UNAUTHORIZED_MESSAGE))
}

/// 403 for an authenticated principal lacking the required role
pub fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error("Forbidden"))
}

/// Run `validator` rules and render failures as a 400 with field errors
pub fn validate_request<T: Validate>(request: &T) -> Result<(), HttpResponse> {
    request.validate().map_err(|errors| validation_error(&errors))
}

pub fn validation_error(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                FieldError::new(field, message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));

    HttpResponse::BadRequest().json(ApiResponse::validation("Validation failed", fields))
}

/// Body deserialization failures answer with the envelope instead of plain text
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected request body");
    let response = HttpResponse::BadRequest().json(ApiResponse::error("Invalid request body"));
    InternalError::from_response(error, response).into()
}
