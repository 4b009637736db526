//! Session management: login, rotation, logout and reset token redemption
//! on top of the token engine and the revocation store.

mod manager;

#[cfg(test)]
pub(crate) mod tests;

pub use manager::SessionManager;
