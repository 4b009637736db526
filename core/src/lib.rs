//! # CBT Core
//!
//! Token engine and domain layer for the CBT backend.
//! This crate contains the domain entities, the error taxonomy, repository
//! interfaces, and the services that issue, verify, rotate and revoke
//! credentials: `TokenIssuer`, `TokenVerifier`, `SessionManager`, `AuthGate`
//! and the account-level `AuthService`.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::{
    Claims, Principal, PrincipalId, ResetToken, RevocationKey, Role, SignedToken, TokenKind,
    TokenPair,
};
pub use domain::value_objects::{Identity, Rotation, SessionGrant};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{
    InMemoryRevocationStore, InMemoryUserRepository, RevocationStore, UserRepository,
};
pub use services::{
    AuthGate, AuthService, AuthServiceConfig, BcryptPasswordHasher, GateVerdict, Gatekeeper,
    OutboxResetLinkSender, PasswordHasher, PresentedCredentials, ResetLinkSender, SessionManager,
    TokenIssuer, TokenServiceConfig, TokenVerifier,
};
