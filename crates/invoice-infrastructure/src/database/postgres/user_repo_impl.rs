// ============================================================================
// Invoice Infrastructure - PostgreSQL User Repository
// File: crates/invoice-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use invoice_core::domain::{ResetTokenRecord, User};
use invoice_core::error::DomainError;
use invoice_core::repositories::UserRepository;

const USER_COLUMNS: &str = "id, name, email, password_hash, reset_token_hash, \
                            reset_token_expires_at, created_at, modified_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        // The table CHECK keeps both reset columns set or both null.
        let reset_token = match (row.reset_token_hash, row.reset_token_expires_at) {
            (Some(token_hash), Some(expires_at)) => Some(ResetTokenRecord {
                token_hash,
                expires_at,
            }),
            _ => None,
        };

        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            reset_token,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding user by email", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let (reset_hash, reset_expires) = split_reset_token(user);

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                id, name, email, password_hash,
                reset_token_hash, reset_token_expires_at, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(reset_hash)
        .bind(reset_expires)
        .bind(user.created_at)
        .bind(user.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                info!("Rejected duplicate registration for existing email");
                DomainError::EmailAlreadyExists(user.email.clone())
            } else {
                db_error("creating user", e)
            }
        })?;

        info!("User created successfully: {}", row.id);
        Ok(row.into())
    }

    async fn set_reset_token(
        &self,
        id: &Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                reset_token_hash = $2,
                reset_token_expires_at = $3,
                modified_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("storing reset token", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        // Single statement: the row lock taken by UPDATE means a second
        // concurrent consumer re-evaluates the WHERE clause and matches nothing.
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET
                password_hash = $2,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                modified_at = $3
            WHERE reset_token_hash = $1 AND reset_token_expires_at > $3
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(token_hash)
        .bind(new_password_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("consuming reset token", e))?;

        Ok(row.map(|r| r.into()))
    }
}

fn split_reset_token(user: &User) -> (Option<&str>, Option<DateTime<Utc>>) {
    match &user.reset_token {
        Some(record) => (Some(record.token_hash.as_str()), Some(record.expires_at)),
        None => (None, None),
    }
}
