//! Token engine: signing and verification of access, refresh and reset tokens
//!
//! - [`TokenIssuer`] mints signed tokens with a fresh JTI per token
//! - [`TokenVerifier`] checks algorithm, signature, issuer, audience and expiry
//!
//! Neither touches the revocation store; persistence belongs to the
//! session manager.

mod config;
mod issuer;
mod keys;
mod verifier;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use keys::TokenKeys;
pub use verifier::TokenVerifier;
