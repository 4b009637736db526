//! Account service module
//!
//! Registration, login, password reset and logout for users and admins,
//! built on the session manager:
//! - Password hashing behind [`PasswordHasher`]
//! - Reset link delivery behind [`ResetLinkSender`]
//! - Detached last-login updates via [`LastLoginRecorder`]

mod config;
mod last_login;
mod password;
mod reset_link;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use last_login::LastLoginRecorder;
pub use password::{BcryptPasswordHasher, PasswordHasher};
pub use reset_link::{OutboxMessage, OutboxResetLinkSender, ResetLinkSender};
pub use service::AuthService;
