//! Results handed back by the session layer

use crate::domain::entities::{Principal, PrincipalId, TokenPair};

/// Identity established for a request by a live access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub principal_id: PrincipalId,
    pub email: String,
    /// JTI of the access token that authorized the request
    pub access_jti: String,
}

/// Outcome of a successful refresh token rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub principal_id: PrincipalId,
    pub email: String,
    pub pair: TokenPair,
}

impl Rotation {
    /// Identity carried forward after rotation; the principal is unchanged
    pub fn identity(&self) -> Identity {
        Identity {
            principal_id: self.principal_id,
            email: self.email.clone(),
            access_jti: self.pair.access_jti.clone(),
        }
    }
}

/// A signed-in principal with the credentials issued to it
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub principal: Principal,
    pub tokens: TokenPair,
}
