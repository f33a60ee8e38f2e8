//! Substitute search against a real product table.

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use purbeurre_core::{NutritionGrade, PageRequest};
use purbeurre_integration_tests::{insert_product, seed_catalogue};
use purbeurre_web::services::SubstituteFinder;
use purbeurre_web::services::substitutes::SearchError;

fn names(search: &purbeurre_web::services::substitutes::SubstituteSearch) -> Vec<&str> {
    search
        .substitutes
        .items()
        .iter()
        .map(|p| p.name.as_str())
        .collect()
}

// =============================================================================
// Reference resolution
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_better_same_category_products_best_first(pool: PgPool) {
    let catalogue = seed_catalogue(&pool).await;

    let search = SubstituteFinder::new(&pool)
        .search("item_2", PageRequest::first())
        .await
        .unwrap();

    assert_eq!(search.reference.id, catalogue.item_2.id);
    // item_4 shares the grade, item_5 is in another category
    assert_eq!(names(&search), vec!["item_3", "item_1"]);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_query_is_case_insensitive(pool: PgPool) {
    let catalogue = seed_catalogue(&pool).await;

    let search = SubstituteFinder::new(&pool)
        .search("  ITEM_2 ", PageRequest::first())
        .await
        .unwrap();

    assert_eq!(search.reference.id, catalogue.item_2.id);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_first_matching_product_is_the_reference(pool: PgPool) {
    let first = insert_product(&pool, "Nutella pâte à tartiner", "pates-a-tartiner", NutritionGrade::E).await;
    insert_product(&pool, "Nutella biscuits", "biscuits", NutritionGrade::E).await;

    let search = SubstituteFinder::new(&pool)
        .search("nutella", PageRequest::first())
        .await
        .unwrap();

    assert_eq!(search.reference.id, first.id);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_best_product_has_no_substitutes(pool: PgPool) {
    seed_catalogue(&pool).await;

    let search = SubstituteFinder::new(&pool)
        .search("item_3", PageRequest::first())
        .await
        .unwrap();

    assert_eq!(search.reference.name, "item_3");
    assert!(search.substitutes.is_empty());
}

// =============================================================================
// No match
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_query_finds_nothing(pool: PgPool) {
    seed_catalogue(&pool).await;

    let result = SubstituteFinder::new(&pool)
        .search("choucroute", PageRequest::first())
        .await;

    assert!(matches!(result, Err(SearchError::NoProductFound)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_blank_query_finds_nothing(pool: PgPool) {
    seed_catalogue(&pool).await;

    let result = SubstituteFinder::new(&pool)
        .search("   ", PageRequest::first())
        .await;

    assert!(matches!(result, Err(SearchError::NoProductFound)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_like_wildcards_match_literally(pool: PgPool) {
    seed_catalogue(&pool).await;

    let result = SubstituteFinder::new(&pool)
        .search("%", PageRequest::first())
        .await;

    assert!(matches!(result, Err(SearchError::NoProductFound)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_query_with_nul_finds_nothing(pool: PgPool) {
    seed_catalogue(&pool).await;

    let result = SubstituteFinder::new(&pool)
        .search("item\0", PageRequest::first())
        .await;

    assert!(matches!(result, Err(SearchError::NoProductFound)));
}

// =============================================================================
// Cap
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_substitutes_are_capped_at_six(pool: PgPool) {
    insert_product(&pool, "soda", "boissons", NutritionGrade::E).await;
    for i in 0..8 {
        insert_product(&pool, &format!("eau {i}"), "boissons", NutritionGrade::A).await;
    }

    let search = SubstituteFinder::new(&pool)
        .search("soda", PageRequest::first())
        .await
        .unwrap();

    assert_eq!(search.substitutes.items().len(), 6);
    assert_eq!(search.substitutes.window().total_pages(), 1);
    assert!(
        search
            .substitutes
            .items()
            .iter()
            .all(|p| p.nutrition_grade == NutritionGrade::A)
    );
}
