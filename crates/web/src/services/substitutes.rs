//! Substitute finder.
//!
//! Resolves a free-text query to a reference product, then suggests
//! healthier products from the same category.

use sqlx::PgPool;
use thiserror::Error;

use purbeurre_core::{MAX_SUBSTITUTES, Page, PageRequest, rank_substitutes};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Substitutes shown per page. Equal to the cap, so there is one page.
pub const SUBSTITUTES_PER_PAGE: u64 = MAX_SUBSTITUTES as u64;

/// Errors from a substitute search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was blank or matched no product name.
    #[error("no product found")]
    NoProductFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a substitute search.
#[derive(Debug, Clone)]
pub struct SubstituteSearch {
    /// The product the query resolved to.
    pub reference: Product,
    /// Same-category products with a strictly better grade, best first.
    pub substitutes: Page<Product>,
}

/// Substitute finder backed by the product table.
pub struct SubstituteFinder<'a> {
    products: ProductRepository<'a>,
}

impl<'a> SubstituteFinder<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Search for substitutes of the first product whose name contains `query`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::NoProductFound` if the query is blank, contains a
    /// NUL character, or matches nothing.
    /// Returns `SearchError::Repository` if a query fails.
    pub async fn search(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<SubstituteSearch, SearchError> {
        let query = query.trim();
        // PostgreSQL text cannot hold NUL, so no product name contains one.
        if query.is_empty() || query.contains('\0') {
            return Err(SearchError::NoProductFound);
        }

        let reference = self
            .products
            .find_first_by_name(query)
            .await?
            .ok_or(SearchError::NoProductFound)?;

        let candidates = self
            .products
            .list_better_in_category(&reference.category, reference.nutrition_grade)
            .await?;

        let substitutes = rank_substitutes(&reference, candidates);

        tracing::debug!(
            query,
            reference_id = %reference.id,
            substitutes = substitutes.len(),
            "Substitute search"
        );

        Ok(SubstituteSearch {
            substitutes: Page::paginate(substitutes, page, SUBSTITUTES_PER_PAGE),
            reference,
        })
    }
}
