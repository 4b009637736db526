use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use cbt_api::{config::Config, create_app, telemetry, AppState};
use cbt_core::{
    AuthService, AuthServiceConfig, BcryptPasswordHasher, Clock, SessionManager, SystemClock,
    TokenIssuer, TokenServiceConfig, TokenVerifier,
};
use cbt_infra::{DatabasePool, MySqlUserRepository, RedisClient, RedisRevocationStore, TracingResetLinkSender};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Invalid configuration")?;
    telemetry::init(&config.app.logging);

    info!(environment = %config.app.environment, "Starting CBT API server");

    let redis = RedisClient::new(config.app.cache.clone())
        .await
        .context("Failed to connect to Redis")?;
    let store = Arc::new(RedisRevocationStore::new(redis));

    let database = DatabasePool::new(config.app.database.clone())
        .await
        .context("Failed to connect to the database")?;
    database
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;
    let users = Arc::new(MySqlUserRepository::new(database.get_pool().clone()));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let token_config = TokenServiceConfig::from(&config.app.auth.jwt);
    let sessions = Arc::new(SessionManager::new(
        TokenIssuer::new(token_config.clone(), Arc::clone(&clock)),
        TokenVerifier::new(&token_config, Arc::clone(&clock)),
        store,
        clock,
    ));

    let auth_service = Arc::new(AuthService::new(
        users,
        sessions,
        Arc::new(BcryptPasswordHasher::new()),
        Arc::new(TracingResetLinkSender::new(config.reset_link_base_url.clone())),
        AuthServiceConfig::from(&config.app.auth),
    ));

    let app_state = web::Data::new(AppState::new(
        auth_service,
        config.app.auth.cookies.clone(),
    ));
    let cors = config.app.cors.clone();
    let bind_address = config.app.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &cors));
    if config.app.server.workers > 0 {
        server = server.workers(config.app.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    database.close().await;
    Ok(())
}
