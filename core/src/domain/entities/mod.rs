//! Domain entities

pub mod principal;
pub mod token;

pub use principal::{normalize_email, Principal, PrincipalId, Role};
pub use token::{
    Claims, ResetToken, RevocationKey, SignedToken, TokenKind, TokenPair,
};
