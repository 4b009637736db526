//! MySQL implementation of the UserRepository trait.
//!
//! Principals live in the `principals` table; emails are stored normalized
//! and guarded by a unique index, so duplicate detection is the database's.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};

use cbt_core::domain::entities::{normalize_email, Principal, PrincipalId, Role};
use cbt_core::errors::{AuthError, DomainError};
use cbt_core::repositories::UserRepository;

const SELECT_COLUMNS: &str = "SELECT id, full_name, email, password_hash, role, is_approved, \
     created_at, updated_at, last_login_at FROM principals";

/// MySQL implementation of UserRepository
#[derive(Clone)]
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to a Principal
    fn row_to_principal(row: &MySqlRow) -> Result<Principal, DomainError> {
        let role: String = row.try_get("role").map_err(column_error("role"))?;

        Ok(Principal {
            id: row.try_get("id").map_err(column_error("id"))?,
            full_name: row.try_get("full_name").map_err(column_error("full_name"))?,
            email: row.try_get("email").map_err(column_error("email"))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(column_error("password_hash"))?,
            role: role.parse::<Role>().map_err(DomainError::internal)?,
            is_approved: row
                .try_get("is_approved")
                .map_err(column_error("is_approved"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(column_error("created_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(column_error("updated_at"))?,
            last_login_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_login_at")
                .map_err(column_error("last_login_at"))?,
        })
    }

    async fn require(&self, id: PrincipalId) -> Result<Principal, DomainError> {
        self.find_by_id(id).await?.ok_or_else(|| DomainError::NotFound {
            resource: "User".to_string(),
        })
    }
}

fn column_error(column: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::internal(format!("Failed to get {}: {}", column, e))
}

fn query_error(e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "User store query failed");
    DomainError::internal(format!("Database error: {}", e))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        let sql = format!("{} WHERE email = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(Self::row_to_principal).transpose()
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.as_ref().map(Self::row_to_principal).transpose()
    }

    async fn create(&self, mut principal: Principal) -> Result<Principal, DomainError> {
        principal.email = normalize_email(&principal.email);

        let result = sqlx::query(
            "INSERT INTO principals \
             (full_name, email, password_hash, role, is_approved, created_at, updated_at, last_login_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&principal.full_name)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(principal.role.as_str())
        .bind(principal.is_approved)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .bind(principal.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::from(AuthError::EmailAlreadyExists)
            } else {
                query_error(e)
            }
        })?;

        principal.id = result.last_insert_id() as PrincipalId;
        tracing::debug!(principal_id = principal.id, "Principal inserted");
        Ok(principal)
    }

    async fn update_last_login(&self, id: PrincipalId) -> Result<Principal, DomainError> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE principals SET last_login_at = ?, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }
        self.require(id).await
    }

    async fn update_password_hash(
        &self,
        id: PrincipalId,
        password_hash: &str,
    ) -> Result<Principal, DomainError> {
        let result =
            sqlx::query("UPDATE principals SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }
        self.require(id).await
    }
}
