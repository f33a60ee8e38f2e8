//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, FlashLevel, RequireAuth, clear_current_user, refresh_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::{AuthError, FieldErrors};
use crate::state::AppState;

/// Mail change form data.
#[derive(Debug, Deserialize)]
pub struct MailChangeForm {
    pub email: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub account: CurrentUser,
}

/// Mail change page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/mail_change.html")]
pub struct MailChangeTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub errors: FieldErrors,
}

/// Show the logged-in user's username and email.
pub async fn profile(RequireAuth(user): RequireAuth, flash: Flash) -> impl IntoResponse {
    ProfileTemplate {
        account: user.clone(),
        ctx: PageContext::new(Some(user), flash.take().await),
    }
}

/// Display the mail change form, prefilled with the current address.
pub async fn mail_change_page(RequireAuth(user): RequireAuth, flash: Flash) -> impl IntoResponse {
    MailChangeTemplate {
        email: user.email.to_string(),
        ctx: PageContext::new(Some(user), flash.take().await),
        errors: FieldErrors::new(),
    }
}

/// Handle mail change form submission.
#[instrument(skip(state, session, flash, user, form))]
pub async fn mail_change(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    flash: Flash,
    Form(form): Form<MailChangeForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .change_email(user.id, &form.email)
        .await
    {
        Ok(updated) => {
            refresh_current_user(&session, &CurrentUser::from(&updated)).await?;
            flash
                .push(
                    FlashLevel::Success,
                    "Votre adresse email a bien été modifiée.",
                )
                .await?;
            Ok(Redirect::to("/profile").into_response())
        }
        Err(AuthError::InvalidForm(errors)) => Ok(MailChangeTemplate {
            ctx: PageContext::new(Some(user), flash.take().await),
            email: form.email,
            errors,
        }
        .into_response()),
        Err(AuthError::UserNotFound) => {
            // The account was deleted while the session was alive.
            tracing::warn!(user_id = %user.id, "Session user no longer exists");
            clear_current_user(&session).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => Err(e.into()),
    }
}
