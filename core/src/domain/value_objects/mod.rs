//! Value objects returned by the services

pub mod session;

pub use session::{Identity, Rotation, SessionGrant};
