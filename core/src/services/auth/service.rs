//! Main account service implementation

use std::sync::Arc;

use crate::domain::entities::{Principal, PrincipalId, Role, TokenPair};
use crate::domain::value_objects::{Rotation, SessionGrant};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::revocation::RevocationStore;
use crate::repositories::user::UserRepository;
use crate::services::session::SessionManager;

use super::config::AuthServiceConfig;
use super::last_login::LastLoginRecorder;
use super::password::PasswordHasher;
use super::reset_link::ResetLinkSender;

/// Account service for users and admins
pub struct AuthService<U, S>
where
    U: UserRepository,
    S: RevocationStore,
{
    /// User repository for principal persistence
    users: Arc<U>,
    /// Session manager owning the token lifecycle
    sessions: Arc<SessionManager<S>>,
    hasher: Arc<dyn PasswordHasher>,
    reset_links: Arc<dyn ResetLinkSender>,
    last_login: LastLoginRecorder,
}

impl<U, S> AuthService<U, S>
where
    U: UserRepository + 'static,
    S: RevocationStore + 'static,
{
    /// Create a new account service
    ///
    /// # Arguments
    ///
    /// * `users` - Repository for principal persistence
    /// * `sessions` - Session manager issuing and revoking tokens
    /// * `hasher` - Password hash and compare
    /// * `reset_links` - Delivery of password reset links
    /// * `config` - Service configuration
    pub fn new(
        users: Arc<U>,
        sessions: Arc<SessionManager<S>>,
        hasher: Arc<dyn PasswordHasher>,
        reset_links: Arc<dyn ResetLinkSender>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            reset_links,
            last_login: LastLoginRecorder::new(config.last_login_timeout),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager<S>> {
        &self.sessions
    }

    pub fn last_login(&self) -> &LastLoginRecorder {
        &self.last_login
    }

    /// Register a regular user and sign them in
    ///
    /// # Returns
    ///
    /// * `Ok(SessionGrant)` - The created principal and its first token pair
    /// * `Err(DomainError)` - Email taken, hashing failed, or tokens could not be persisted
    pub async fn register_user(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<SessionGrant> {
        self.ensure_email_available(email).await?;
        let password_hash = self.hash_password(password).await?;

        let principal = self
            .users
            .create(Principal::new_user(
                full_name.trim().to_string(),
                email.to_string(),
                password_hash,
            ))
            .await?;

        tracing::info!(principal_id = principal.id, role = %principal.role, "Principal registered");
        self.open_session(principal).await
    }

    /// Register an admin awaiting approval; no tokens are issued
    pub async fn register_admin(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<Principal> {
        self.ensure_email_available(email).await?;
        let password_hash = self.hash_password(password).await?;

        let principal = self
            .users
            .create(Principal::new_admin(
                full_name.trim().to_string(),
                email.to_string(),
                password_hash,
            ))
            .await?;

        tracing::info!(principal_id = principal.id, role = %principal.role, "Admin registered, awaiting approval");
        Ok(principal)
    }

    /// Sign in a regular user
    pub async fn login_user(&self, email: &str, password: &str) -> DomainResult<SessionGrant> {
        self.login(email, password, Role::User).await
    }

    /// Sign in an approved admin
    pub async fn login_admin(&self, email: &str, password: &str) -> DomainResult<SessionGrant> {
        self.login(email, password, Role::Admin).await
    }

    /// Issue a reset token and hand it to the reset link sender
    ///
    /// Unknown emails succeed silently so callers cannot discover which accounts exist.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<()> {
        let Some(principal) = self.users.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let reset = self.sessions.issue_reset_token(&principal).await?;
        self.reset_links.send_reset_link(&principal, &reset).await?;

        tracing::info!(principal_id = principal.id, expires_at = %reset.expires_at, "Password reset issued");
        Ok(())
    }

    /// Redeem a reset token and replace the password
    ///
    /// The new password is hashed before the token is consumed, so a hashing
    /// failure leaves the token usable. Every access and refresh token issued
    /// to the principal is revoked before the hash is written.
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> DomainResult<()> {
        let password_hash = self.hash_password(new_password).await?;
        let principal_id = self.sessions.redeem_reset_token(reset_token).await?;

        // Sessions opened under the old password end before it is replaced
        let revoked = self.sessions.revoke_all(principal_id).await?;
        tracing::debug!(principal_id, revoked, "Sessions ended by password reset");

        match self
            .users
            .update_password_hash(principal_id, &password_hash)
            .await
        {
            Ok(_) => {
                tracing::info!(principal_id, "Password reset completed");
                Ok(())
            }
            Err(DomainError::NotFound { .. }) => Err(AuthError::UserNotFound.into()),
            Err(e) => Err(e),
        }
    }

    /// Revoke the presented credentials
    pub async fn logout(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> DomainResult<()> {
        self.sessions
            .logout_tokens(access_token, refresh_token)
            .await?;
        Ok(())
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<Rotation> {
        Ok(self.sessions.rotate(refresh_token).await?)
    }

    /// Load the principal behind an authorized request
    pub async fn current_principal(&self, principal_id: PrincipalId) -> DomainResult<Principal> {
        self.users
            .find_by_id(principal_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    async fn login(&self, email: &str, password: &str, role: Role) -> DomainResult<SessionGrant> {
        let principal = match self.users.find_by_email(email).await? {
            Some(principal) if principal.role == role => principal,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        if !self.verify_password(&principal.password_hash, password).await? {
            tracing::debug!(principal_id = principal.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !principal.can_sign_in() {
            tracing::info!(principal_id = principal.id, "Sign-in refused, account not approved");
            return Err(AuthError::AccountNotApproved.into());
        }

        self.open_session(principal).await
    }

    async fn open_session(&self, principal: Principal) -> DomainResult<SessionGrant> {
        let tokens: TokenPair = self.sessions.login(&principal).await?;
        self.last_login.record(Arc::clone(&self.users), principal.id);
        Ok(SessionGrant { principal, tokens })
    }

    async fn ensure_email_available(&self, email: &str) -> DomainResult<()> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, digest: &str, password: &str) -> DomainResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let digest = digest.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &password))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {}", e)))?
    }
}
