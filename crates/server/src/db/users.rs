//! `PostgreSQL` user store.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use recipe_accounts_core::{Email, TokenDigest, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Row shape shared by every query that returns a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: Option<String>,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map unique and foreign-key violations onto repository errors.
fn map_constraint_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// `PostgreSQL`-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO accounts.user (email, password_hash, name, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, is_staff, is_superuser, is_active,
                      created_at, updated_at
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.name.as_deref())
        .bind(new_user.kind.is_staff())
        .bind(new_user.kind.is_superuser())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "email already exists"))?;

        row.try_into()
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, is_staff, is_superuser, is_active,
                   created_at, updated_at
            FROM accounts.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, is_staff, is_superuser, is_active,
                   created_at, updated_at
            FROM accounts.user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT id, email, name, is_staff, is_superuser, is_active,
                   created_at, updated_at, password_hash
            FROM accounts.user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some((r.user.try_into()?, r.password_hash)))
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE accounts.user
            SET password_hash = $1, updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_name(&self, id: UserId, name: Option<&str>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE accounts.user
            SET name = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, name, is_staff, is_superuser, is_active,
                      created_at, updated_at
            ",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE accounts.user
            SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(active)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn replace_token(
        &self,
        id: UserId,
        digest: &TokenDigest,
    ) -> Result<(), RepositoryError> {
        // Single upsert: concurrent logins for one user resolve to the last write.
        sqlx::query(
            r"
            INSERT INTO accounts.auth_token (user_id, token_digest)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET token_digest = EXCLUDED.token_digest, created_at = NOW()
            ",
        )
        .bind(id)
        .bind(digest.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "token already exists"))?;

        Ok(())
    }

    async fn get_by_token(&self, digest: &TokenDigest) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.email, u.name, u.is_staff, u.is_superuser, u.is_active,
                   u.created_at, u.updated_at
            FROM accounts.auth_token t
            JOIN accounts.user u ON u.id = t.user_id
            WHERE t.token_digest = $1
            ",
        )
        .bind(digest.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
