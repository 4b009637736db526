//! Application factory
//!
//! Builds the actix-web `App` from an [`AppState`]; the binary and the
//! integration tests share it.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use cbt_core::repositories::{RevocationStore, UserRepository};
use cbt_shared::config::CorsConfig;
use cbt_shared::ApiResponse;

use crate::handlers::json_error_handler;
use crate::middleware::create_cors;
use crate::routes::auth::{
    login::{login_admin, login_user},
    logout::logout,
    me::{me, me_admin},
    password::{forgot_password, reset_password},
    refresh::refresh,
    register::{register_admin, register_user},
    AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<U, S>(
    app_state: web::Data<AppState<U, S>>,
    cors: &CorsConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    let guard = app_state.guard();

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(register_user::<U, S>))
                .route("/login", web::post().to(login_user::<U, S>))
                .route("/forgot-password", web::post().to(forgot_password::<U, S>))
                .route("/reset-password", web::post().to(reset_password::<U, S>))
                .route("/refresh", web::post().to(refresh::<U, S>))
                .route("/logout", web::post().to(logout::<U, S>))
                .service(
                    web::resource("/me")
                        .route(web::get().to(me::<U, S>))
                        .wrap(guard.clone()),
                ),
        )
        .service(
            web::scope("/api/admin")
                .route("/register", web::post().to(register_admin::<U, S>))
                .route("/login", web::post().to(login_admin::<U, S>))
                .route("/forgot-password", web::post().to(forgot_password::<U, S>))
                .route("/reset-password", web::post().to(reset_password::<U, S>))
                .route("/refresh", web::post().to(refresh::<U, S>))
                .route("/logout", web::post().to(logout::<U, S>))
                .service(
                    web::resource("/me")
                        .route(web::get().to(me_admin::<U, S>))
                        .wrap(guard),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "cbt-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error("The requested resource was not found"))
}
