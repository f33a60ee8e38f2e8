//! Product domain type.

use serde::Serialize;

use purbeurre_core::{NutritionGrade, ProductId, Substitutable};

/// A packaged food product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (unique).
    pub name: String,
    /// Brand(s), as listed by the catalogue.
    pub brand: String,
    /// Category label, e.g. `jus-de-pomme`.
    pub category: String,
    /// Nutrition grade, A (best) to E (worst).
    pub nutrition_grade: NutritionGrade,
    /// Front-of-pack image shown in listings.
    pub picture: String,
    /// Image of the nutrition facts label.
    pub nutrition_image: String,
    /// Source page in the product catalogue.
    pub url: String,
}

impl Substitutable for Product {
    fn id(&self) -> ProductId {
        self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn grade(&self) -> NutritionGrade {
        self.nutrition_grade
    }
}
