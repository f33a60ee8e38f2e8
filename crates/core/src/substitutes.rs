//! Healthier-substitute ranking.
//!
//! A substitute for a reference product is a product from the same category
//! whose nutrition grade is strictly better. Substitutes are listed best
//! grade first, ties in product-ID order, and at most [`MAX_SUBSTITUTES`]
//! are kept.

use crate::types::{NutritionGrade, ProductId};

/// Maximum number of substitutes suggested for one product.
pub const MAX_SUBSTITUTES: usize = 6;

/// What the ranking needs to know about a product.
pub trait Substitutable {
    fn id(&self) -> ProductId;
    fn category(&self) -> &str;
    fn grade(&self) -> NutritionGrade;
}

/// Rank `candidates` as substitutes for `reference`.
///
/// Candidates from other categories, and those whose grade is equal to or
/// worse than the reference's, are dropped. The reference itself never
/// qualifies since its grade is not strictly better than its own.
pub fn rank_substitutes<R, T>(reference: &R, candidates: impl IntoIterator<Item = T>) -> Vec<T>
where
    R: Substitutable + ?Sized,
    T: Substitutable,
{
    let mut substitutes: Vec<T> = candidates
        .into_iter()
        .filter(|c| c.category() == reference.category())
        .filter(|c| c.grade().is_better_than(reference.grade()))
        .collect();

    substitutes.sort_by_key(|c| (c.grade(), c.id()));
    substitutes.truncate(MAX_SUBSTITUTES);
    substitutes
}

/// Build a case-insensitive `LIKE`/`ILIKE` pattern matching names that
/// contain `query`.
///
/// `%`, `_` and `\` in the query are escaped so they match literally
/// (PostgreSQL's default escape character is `\`).
///
/// ```
/// use purbeurre_core::contains_pattern;
///
/// assert_eq!(contains_pattern("nutella"), "%nutella%");
/// assert_eq!(contains_pattern("100%"), "%100\\%%");
/// ```
#[must_use]
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
