pub mod auth;
pub mod cors;

pub use auth::{AuthContext, AuthGuard};
pub use cors::create_cors;
