//! Authentication route handlers.
//!
//! Registration, login and logout with locally stored accounts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::PageContext;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Flash, FlashLevel, OptionalAuth, clear_current_user, safe_next, set_current_user,
};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::{AuthError, FieldErrors, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(user): OptionalAuth, flash: Flash) -> impl IntoResponse {
    RegisterTemplate {
        ctx: PageContext::new(user, flash.take().await),
        username: String::new(),
        email: String::new(),
        errors: FieldErrors::new(),
    }
}

/// Handle registration form submission.
///
/// Invalid input redisplays the form with per-field messages; success sends
/// the new user to the login page.
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = Registration {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        password_confirmation: &form.password_confirmation,
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(_) => {
            flash
                .push(
                    FlashLevel::Success,
                    "Votre compte a été créé, vous pouvez maintenant vous connecter.",
                )
                .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AuthError::InvalidForm(errors)) => Ok(RegisterTemplate {
            ctx: PageContext::new(user, flash.take().await),
            username: form.username,
            email: form.email,
            errors,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
    Query(query): Query<NextQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        ctx: PageContext::new(user, flash.take().await),
        username: String::new(),
        next: safe_next(query.next.as_deref()).to_owned(),
        error: None,
    }
}

/// Handle login form submission.
///
/// On success the user is stored in a fresh session and sent to `next` when
/// it is a local path.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    flash: Flash,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_owned();

    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            set_sentry_user(&user.id, user.username.as_str());
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(&next).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %form.username, "Login failed");
            Ok(LoginTemplate {
                ctx: PageContext::new(None, flash.take().await),
                username: form.username,
                next,
                error: Some(
                    "Saisissez un nom d'utilisateur et un mot de passe valides.".to_owned(),
                ),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the landing page.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}
