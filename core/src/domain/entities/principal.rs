//! Principal entity: an account that can authenticate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a principal, assigned by the user store
pub type PrincipalId = i64;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular user
    User,
    /// An administrator; must be approved before signing in
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// An authenticated identity as stored by the user store
///
/// The token engine only reads `id`, `email` and `role` at issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Store-assigned identifier (0 until persisted)
    pub id: PrincipalId,

    /// Display name
    pub full_name: String,

    /// Login email, unique across principals
    pub email: String,

    /// One-way password digest
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// Admin approval flag; regular users are approved on creation
    pub is_approved: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub last_login_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Creates a regular user, approved on creation
    pub fn new_user(full_name: String, email: String, password_hash: String) -> Self {
        Self::new(full_name, email, password_hash, Role::User, true)
    }

    /// Creates an administrator awaiting approval
    pub fn new_admin(full_name: String, email: String, password_hash: String) -> Self {
        Self::new(full_name, email, password_hash, Role::Admin, false)
    }

    fn new(
        full_name: String,
        email: String,
        password_hash: String,
        role: Role,
        is_approved: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            full_name,
            email: normalize_email(&email),
            password_hash,
            role,
            is_approved,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the account may be issued credentials
    pub fn can_sign_in(&self) -> bool {
        self.is_approved
    }

    /// Marks the account as approved
    pub fn approve(&mut self) {
        self.is_approved = true;
        self.updated_at = Utc::now();
    }

    /// Updates the last login timestamp
    pub fn touch_last_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }

    /// Replaces the password digest
    pub fn set_password_hash(&mut self, password_hash: String, at: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.updated_at = at;
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_approved() {
        let user = Principal::new_user(
            "Ada Lovelace".to_string(),
            "Ada@Example.com ".to_string(),
            "digest".to_string(),
        );

        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "ada@example.com");
        assert!(user.can_sign_in());
        assert!(!user.is_admin());
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_new_admin_awaits_approval() {
        let mut admin = Principal::new_admin(
            "Grace Hopper".to_string(),
            "grace@example.com".to_string(),
            "digest".to_string(),
        );

        assert!(admin.is_admin());
        assert!(!admin.can_sign_in());

        admin.approve();
        assert!(admin.can_sign_in());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = Principal::new_user(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "secret-digest".to_string(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-digest"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }
}
