//! Registration, login and email change against a real database.

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use purbeurre_core::UserId;
use purbeurre_integration_tests::{PASSWORD, create_user};
use purbeurre_web::db::UserRepository;
use purbeurre_web::services::AuthService;
use purbeurre_web::services::auth::{AuthError, Registration, fields};

fn registration<'a>(username: &'a str, email: &'a str) -> Registration<'a> {
    Registration {
        username,
        email,
        password: PASSWORD,
        password_confirmation: PASSWORD,
    }
}

// =============================================================================
// Registration
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_register_then_login(pool: PgPool) {
    let auth = AuthService::new(&pool);

    let user = auth
        .register(registration("marie", "marie@example.fr"))
        .await
        .unwrap();
    let logged_in = auth.login("marie", PASSWORD).await.unwrap();

    assert_eq!(logged_in.id, user.id);
    assert_eq!(logged_in.email.as_str(), "marie@example.fr");
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_username_is_a_field_error(pool: PgPool) {
    create_user(&pool, "marie").await;

    let result = AuthService::new(&pool)
        .register(registration("marie", "autre@example.fr"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::InvalidForm(e)) if e.has(fields::USERNAME) && !e.has(fields::EMAIL)
    ));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_email_ignores_case(pool: PgPool) {
    create_user(&pool, "marie").await;

    let result = AuthService::new(&pool)
        .register(registration("paul", "MARIE@Example.FR"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::InvalidForm(e)) if e.has(fields::EMAIL) && !e.has(fields::USERNAME)
    ));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_invalid_registration_writes_nothing(pool: PgPool) {
    let result = AuthService::new(&pool)
        .register(Registration {
            username: "marie",
            email: "marie@example.fr",
            password: "12345678",
            password_confirmation: "12345678",
        })
        .await;

    assert!(matches!(result, Err(AuthError::InvalidForm(e)) if e.has(fields::PASSWORD)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_email_with_nul_is_a_field_error(pool: PgPool) {
    let result = AuthService::new(&pool)
        .register(registration("marie", "ma\0rie@example.fr"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::InvalidForm(e)) if e.has(fields::EMAIL) && !e.has(fields::USERNAME)
    ));
}

// =============================================================================
// Login
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_rejects_wrong_password(pool: PgPool) {
    create_user(&pool, "marie").await;

    let result = AuthService::new(&pool).login("marie", "mauvais-mot").await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_login_rejects_unknown_user(pool: PgPool) {
    let result = AuthService::new(&pool).login("personne", PASSWORD).await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

// =============================================================================
// Email change
// =============================================================================

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_email(pool: PgPool) {
    let user = create_user(&pool, "marie").await;

    let updated = AuthService::new(&pool)
        .change_email(user.id, "marie.curie@example.fr")
        .await
        .unwrap();

    assert_eq!(updated.email.as_str(), "marie.curie@example.fr");
    let stored = UserRepository::new(&pool)
        .get_by_id(user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.email.as_str(), "marie.curie@example.fr");
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_email_to_own_address(pool: PgPool) {
    let user = create_user(&pool, "marie").await;

    let result = AuthService::new(&pool)
        .change_email(user.id, "Marie@example.fr")
        .await;

    assert!(result.is_ok());
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_email_to_taken_address(pool: PgPool) {
    let marie = create_user(&pool, "marie").await;
    create_user(&pool, "paul").await;

    let result = AuthService::new(&pool)
        .change_email(marie.id, "paul@example.fr")
        .await;

    assert!(matches!(result, Err(AuthError::InvalidForm(e)) if e.has(fields::EMAIL)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_email_with_nul_is_a_field_error(pool: PgPool) {
    let user = create_user(&pool, "marie").await;

    let result = AuthService::new(&pool)
        .change_email(user.id, "marie\0@example.fr")
        .await;

    assert!(matches!(result, Err(AuthError::InvalidForm(e)) if e.has(fields::EMAIL)));
}

#[sqlx::test(migrations = "../web/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_change_email_of_deleted_account(pool: PgPool) {
    let result = AuthService::new(&pool)
        .change_email(UserId::new(424_242), "fantome@example.fr")
        .await;

    assert!(matches!(result, Err(AuthError::UserNotFound)));
}
