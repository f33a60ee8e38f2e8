//! Favorite repository for database operations.
//!
//! Uniqueness of a (user, product) pair is enforced by the
//! `favorite_user_product_key` constraint, so add and remove are single
//! statements and their affected-row count is the outcome.

use sqlx::PgPool;

use purbeurre_core::{PageWindow, ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::Product;

/// Repository for favorite database operations.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a favorite unless the pair already exists.
    ///
    /// Returns `true` if a row was inserted, `false` if it was already there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product (or user) does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO favorite (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT favorite_user_product_key DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a favorite.
    ///
    /// Returns `true` if a row was deleted, `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorite WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the user has favorited the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorite WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Count the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorite WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative favorite count {count}")))
    }

    /// List the favorited products on one page, ordered by product ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products_for_user(
        &self,
        user_id: UserId,
        window: &PageWindow,
    ) -> Result<Vec<Product>, RepositoryError> {
        let limit = i64::try_from(window.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(window.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.brand, p.category, p.nutrition_grade,
                   p.picture, p.nutrition_image, p.url
            FROM favorite f
            JOIN product p ON p.id = f.product_id
            WHERE f.user_id = $1
            ORDER BY p.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }
}
