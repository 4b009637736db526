//! HTTP surface of the CBT backend
//!
//! Library exports for the binary and the integration tests.

pub mod app;
pub mod config;
pub mod cookies;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::auth::AppState;
