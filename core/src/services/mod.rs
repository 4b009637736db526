//! Business services containing the token engine and account use cases.

pub mod auth;
pub mod gate;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{
    AuthService, AuthServiceConfig, BcryptPasswordHasher, LastLoginRecorder, OutboxResetLinkSender,
    PasswordHasher, ResetLinkSender,
};
pub use gate::{AuthGate, GateVerdict, Gatekeeper, PresentedCredentials};
pub use session::SessionManager;
pub use token::{TokenIssuer, TokenServiceConfig, TokenVerifier};
