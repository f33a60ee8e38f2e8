//! Authentication service.
//!
//! Password registration, login and email change for site accounts.

mod error;

pub use error::{AuthError, FieldErrors};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use purbeurre_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT, UserRepository};
use crate::models::User;

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

const USERNAME_TAKEN: &str = "Un utilisateur avec ce nom existe déjà.";
const EMAIL_TAKEN: &str = "Cette adresse email est déjà utilisée.";

/// Form field names shared with the templates.
pub mod fields {
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
}

/// Submitted registration form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

/// Authentication service.
///
/// Handles user registration, login, and account email changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// Every field is checked before anything is written, so the returned
    /// `FieldErrors` lists all problems at once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidForm` if any field is invalid or the
    /// username/email is already taken.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();

        let username = match Username::parse(form.username) {
            Ok(username) => Some(username),
            Err(e) => {
                errors.add(fields::USERNAME, username_message(&e));
                None
            }
        };

        let email = match Email::parse(form.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.add(fields::EMAIL, email_message(&e));
                None
            }
        };

        validate_password(form.password, form.password_confirmation, &mut errors);

        if let Some(username) = &username
            && self.users.username_exists(username).await?
        {
            errors.add(fields::USERNAME, USERNAME_TAKEN);
        }

        if let Some(email) = &email
            && self.users.email_exists(email, None).await?
        {
            errors.add(fields::EMAIL, EMAIL_TAKEN);
        }

        let (Some(username), Some(email)) = (username, email) else {
            return Err(AuthError::InvalidForm(errors));
        };
        errors.into_result()?;

        let password_hash = hash_password(form.password)?;

        let user = self
            .users
            .create_with_password(&username, &email, &password_hash)
            .await
            .map_err(conflict_to_field_errors)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Replace the email address of an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidForm` if the email is malformed or used by
    /// another account.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn change_email(&self, user_id: UserId, email: &str) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();

        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(e) => {
                errors.add(fields::EMAIL, email_message(&e));
                return Err(AuthError::InvalidForm(errors));
            }
        };

        if self.users.email_exists(&email, Some(user_id)).await? {
            errors.add(fields::EMAIL, EMAIL_TAKEN);
            return Err(AuthError::InvalidForm(errors));
        }

        let user = self
            .users
            .update_email(user_id, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => conflict_to_field_errors(other),
            })?;

        tracing::info!(user_id = %user.id, "User email changed");

        Ok(user)
    }
}

/// Turn a unique-constraint race into the same field error the pre-check gives.
fn conflict_to_field_errors(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(constraint) => {
            let mut errors = FieldErrors::new();
            if constraint == USERNAME_CONSTRAINT {
                errors.add(fields::USERNAME, USERNAME_TAKEN);
            } else if constraint == EMAIL_CONSTRAINT {
                errors.add(fields::EMAIL, EMAIL_TAKEN);
            } else {
                return AuthError::Repository(RepositoryError::Conflict(constraint));
            }
            AuthError::InvalidForm(errors)
        }
        other => AuthError::Repository(other),
    }
}

fn username_message(e: &purbeurre_core::UsernameError) -> String {
    use purbeurre_core::UsernameError;

    match e {
        UsernameError::Empty => "Ce champ est obligatoire.".to_owned(),
        UsernameError::TooLong { max } => {
            format!("Le nom d'utilisateur ne peut pas dépasser {max} caractères.")
        }
        UsernameError::InvalidCharacter(_) => {
            "Seuls les lettres, chiffres et les caractères @/./+/-/_ sont autorisés.".to_owned()
        }
    }
}

fn email_message(e: &purbeurre_core::EmailError) -> String {
    use purbeurre_core::EmailError;

    match e {
        EmailError::Empty => "Ce champ est obligatoire.".to_owned(),
        _ => "Saisissez une adresse email valide.".to_owned(),
    }
}

/// Validate the password and its confirmation, recording problems in `errors`.
fn validate_password(password: &str, confirmation: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.add(fields::PASSWORD, "Ce champ est obligatoire.");
        return;
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            fields::PASSWORD,
            format!("Le mot de passe doit contenir au moins {MIN_PASSWORD_LENGTH} caractères."),
        );
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(
            fields::PASSWORD,
            "Le mot de passe ne peut pas être entièrement numérique.",
        );
    }

    if password != confirmation {
        errors.add(
            fields::PASSWORD_CONFIRMATION,
            "Les deux mots de passe ne correspondent pas.",
        );
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
