//! User repository for database operations.
//!
//! Accounts live in `app_user`; password hashes in `user_password` so the
//! hash is never selected by accident alongside profile data.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use purbeurre_core::{Email, UserId, Username};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Name of the unique constraint on usernames.
pub const USERNAME_CONSTRAINT: &str = "app_user_username_key";

/// Name of the unique index on lower-cased emails.
pub const EMAIL_CONSTRAINT: &str = "app_user_email_key";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for login lookups.
#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, created_at, updated_at
            FROM app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Whether an account already uses this username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM app_user WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Whether another account already uses this email (case-insensitive).
    ///
    /// `except` excludes one account, so a user re-submitting their own
    /// address is not reported as a clash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(
        &self,
        email: &Email,
        except: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM app_user
                WHERE LOWER(email) = LOWER($1) AND ($2::INTEGER IS NULL OR id <> $2)
            )
            ",
        )
        .bind(email.as_str())
        .bind(except)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new user with a password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` carrying [`USERNAME_CONSTRAINT`] or
    /// [`EMAIL_CONSTRAINT`] if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at, updated_at
            ",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let user = User::try_from(row)?;

        sqlx::query(
            r"
            INSERT INTO user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user and their password hash by username.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT u.id, u.username, u.email, u.created_at, u.updated_at,
                   p.password_hash
            FROM app_user u
            LEFT JOIN user_password p ON u.id = p.user_id
            WHERE u.username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(password_hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((User::try_from(row.user)?, password_hash)))
    }

    /// Change a user's email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if another account uses the email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_email(&self, id: UserId, email: &Email) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE app_user
            SET email = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }
}
