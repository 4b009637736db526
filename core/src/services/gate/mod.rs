//! Request-time authorization gate
//!
//! Transport-agnostic: takes the credential strings a request carried and
//! returns a verdict plus any rotated credentials to hand back.

mod machine;

#[cfg(test)]
mod tests;

pub use machine::{AuthGate, GateVerdict, Gatekeeper, PresentedCredentials};
