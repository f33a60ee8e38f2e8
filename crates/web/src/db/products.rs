//! Product repository for database operations.

use sqlx::PgPool;

use purbeurre_core::{MAX_SUBSTITUTES, NutritionGrade, ProductId, contains_pattern};

use super::{RepositoryError, map_unique_violation};
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, brand, category, nutrition_grade, picture, nutrition_image, url";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i32,
    name: String,
    brand: String,
    category: String,
    nutrition_grade: String,
    picture: String,
    nutrition_image: String,
    url: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let nutrition_grade: NutritionGrade = row.nutrition_grade.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            category: row.category,
            nutrition_grade,
            picture: row.picture,
            nutrition_image: row.nutrition_image,
            url: row.url,
        })
    }
}

/// Fields for inserting a product.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub brand: &'a str,
    pub category: &'a str,
    pub nutrition_grade: NutritionGrade,
    pub picture: &'a str,
    pub nutrition_image: &'a str,
    pub url: &'a str,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored grade is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Find the first product (lowest ID) whose name contains `query`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_first_by_name(&self, query: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE name ILIKE $1 ORDER BY id LIMIT 1"
        ))
        .bind(contains_pattern(query))
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// List products of `category` graded strictly better than `grade`,
    /// best grade first.
    ///
    /// At most [`MAX_SUBSTITUTES`] rows are returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_better_in_category(
        &self,
        category: &str,
        grade: NutritionGrade,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
             WHERE category = $1 AND nutrition_grade < $2 \
             ORDER BY nutrition_grade, id \
             LIMIT $3"
        ))
        .bind(category)
        .bind(grade)
        .bind(i64::try_from(MAX_SUBSTITUTES).unwrap_or(i64::MAX))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a product with the same name exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, product: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product (name, brand, category, nutrition_grade, picture, nutrition_image, url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.name)
        .bind(product.brand)
        .bind(product.category)
        .bind(product.nutrition_grade)
        .bind(product.picture)
        .bind(product.nutrition_image)
        .bind(product.url)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        Product::try_from(row)
    }
}
