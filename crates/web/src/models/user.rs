//! User domain types.

use chrono::{DateTime, Utc};

use purbeurre_core::{Email, UserId, Username};

/// A site account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
