//! End-to-end flows through the served router.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, header, redirect};
use sqlx::PgPool;

use purbeurre_integration_tests::{PASSWORD, seed_catalogue, spawn_app};

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn register_and_login(client: &Client, base: &str, next: &str) -> reqwest::Response {
    let response = client
        .post(format!("{base}/register"))
        .form(&[
            ("username", "marie"),
            ("email", "marie@example.fr"),
            ("password", PASSWORD),
            ("password_confirmation", PASSWORD),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    client
        .post(format!("{base}/login"))
        .form(&[("username", "marie"), ("password", PASSWORD), ("next", next)])
        .send()
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_search_then_save_a_substitute(pool: PgPool) {
    let catalogue = seed_catalogue(&pool).await;
    let base = spawn_app(pool).await;
    let client = client();

    let results = client
        .get(format!("{base}/replace?query=item_2"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(results.contains("item_3"));
    assert!(results.contains("item_1"));
    assert!(!results.contains("item_5"));

    let response = register_and_login(&client, &base, "/favorite").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/favorite");

    let response = client
        .post(format!("{base}/add_favorite/{}", catalogue.item_3.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/favorite");

    let favorites = client
        .get(format!("{base}/favorite"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(favorites.contains("item_3"));
    assert!(favorites.contains("Le produit a été ajouté à vos favoris."));

    let detail = client
        .get(format!("{base}/detail/{}", catalogue.item_3.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(detail.contains("Retirer de mes aliments"));
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_product_warns_on_landing_page(pool: PgPool) {
    let catalogue = seed_catalogue(&pool).await;
    let base = spawn_app(pool.clone()).await;
    let client = client();

    register_and_login(&client, &base, "/").await;
    client
        .post(format!("{base}/add_favorite/{}", catalogue.item_1.id))
        .send()
        .await
        .unwrap();
    // Consume the "added" flash so only the search warning is pending.
    client.get(format!("{base}/favorite")).send().await.unwrap();

    let products_before = count(&pool, "product").await;
    let favorites_before = count(&pool, "favorite").await;

    let response = client
        .get(format!("{base}/replace?query=choucroute"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let landing = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(landing.status(), StatusCode::OK);
    // The apostrophe in the message is HTML-escaped.
    assert!(landing.text().await.unwrap().contains("Misère de misère"));

    assert_eq!(count(&pool, "product").await, products_before);
    assert_eq!(count(&pool, "favorite").await, favorites_before);
    assert_eq!(favorites_before, 1);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_logout_ends_the_session(pool: PgPool) {
    let base = spawn_app(pool).await;
    let client = client();

    let response = register_and_login(&client, &base, "/profile").await;
    assert_eq!(location(&response), "/profile");

    let profile = client
        .get(format!("{base}/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    assert!(profile.text().await.unwrap().contains("marie@example.fr"));

    client.get(format!("{base}/logout")).send().await.unwrap();

    let response = client
        .get(format!("{base}/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fprofile");
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_ignores_offsite_next(pool: PgPool) {
    let base = spawn_app(pool).await;
    let client = client();

    let response = register_and_login(&client, &base, "https://evil.example/").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_readiness_with_database(pool: PgPool) {
    let base = spawn_app(pool).await;

    let response = client()
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
