//! Favorite manager.
//!
//! Add and remove are idempotent: repeating them reports the existing state
//! instead of failing.

use sqlx::PgPool;

use purbeurre_core::{Page, PageRequest, ProductId, UserId};

use crate::db::{FavoriteRepository, RepositoryError};
use crate::models::Product;

/// Favorites shown per page.
pub const FAVORITES_PER_PAGE: u64 = 6;

/// Outcome of adding a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyFavorite,
}

/// Outcome of removing a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFavorite,
}

/// Favorite manager for one user's bookmarks.
pub struct FavoriteService<'a> {
    favorites: FavoriteRepository<'a>,
}

impl<'a> FavoriteService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            favorites: FavoriteRepository::new(pool),
        }
    }

    /// Bookmark a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<AddOutcome, RepositoryError> {
        let outcome = if self.favorites.add(user_id, product_id).await? {
            AddOutcome::Added
        } else {
            AddOutcome::AlreadyFavorite
        };

        tracing::debug!(%user_id, %product_id, ?outcome, "Add favorite");
        Ok(outcome)
    }

    /// Remove a bookmark.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<RemoveOutcome, RepositoryError> {
        let outcome = if self.favorites.remove(user_id, product_id).await? {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFavorite
        };

        tracing::debug!(%user_id, %product_id, ?outcome, "Remove favorite");
        Ok(outcome)
    }

    /// Whether the user has bookmarked the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        self.favorites.exists(user_id, product_id).await
    }

    /// One page of the user's favorites, ordered by product ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let total = self.favorites.count_for_user(user_id).await?;
        let window = page.resolve(total, FAVORITES_PER_PAGE);
        let items = self
            .favorites
            .list_products_for_user(user_id, &window)
            .await?;

        Ok(Page::new(items, window))
    }
}
