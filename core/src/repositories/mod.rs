//! Repository interfaces consumed by the token engine and account services.

pub mod revocation;
pub mod user;

pub use revocation::{remaining_ttl, InMemoryRevocationStore, RevocationStore};
pub use user::{InMemoryUserRepository, UserRepository};
