//! Authentication extractors.
//!
//! The logged-in user lives in the session under
//! [`session_keys::CURRENT_USER`]. Handlers state their requirement by taking
//! [`RequireAuth`] or [`OptionalAuth`] as an argument.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{Method, StatusCode, Uri, header::REFERER, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use url::Url;

use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a logged-in user.
///
/// Anonymous visitors are redirected to `/login?next=<path>` so they come
/// back to the page they asked for. A form submission cannot be replayed
/// by a redirect, so for anything but `GET`/`HEAD` the target is the
/// same-site page the form was on, or `/`.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Bonjour {}", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, carrying the requested location.
    RedirectToLogin { next: String },
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        match current_user(session).await {
            Some(user) => Ok(Self(user)),
            None => {
                let state = AppState::from_ref(state);
                Err(AuthRejection::RedirectToLogin {
                    next: return_to(parts, &state.config().base_url),
                })
            }
        }
    }
}

/// Where the login page should send the visitor back to.
fn return_to(parts: &Parts, base_url: &str) -> String {
    if parts.method == Method::GET || parts.method == Method::HEAD {
        return path_and_query(&parts.uri);
    }

    let referer = parts.headers.get(REFERER).and_then(|v| v.to_str().ok());
    local_referer(referer, base_url).unwrap_or_else(|| "/".to_owned())
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login session cookie cannot be
/// reused after authentication.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Replace the session copy of the user without cycling the session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Log out: drop everything stored in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// The login URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Where to go after login: `next` when it is a local path, otherwise `/`.
///
/// Rejects absolute and scheme-relative URLs (`//evil.example`) so the
/// parameter cannot be used as an open redirect.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

/// Path and query of `referer` when it points at this site.
///
/// Absolute URLs must share `base_url`'s origin; relative ones must pass
/// [`safe_next`].
#[must_use]
pub fn local_referer(referer: Option<&str>, base_url: &str) -> Option<String> {
    let referer = referer?;
    let base = Url::parse(base_url).ok()?;

    let url = match Url::parse(referer) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return (safe_next(Some(referer)) == referer).then(|| referer.to_owned());
        }
        Err(_) => return None,
    };

    if url.origin() != base.origin() {
        return None;
    }

    let mut target = url.path().to_owned();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned())
}
