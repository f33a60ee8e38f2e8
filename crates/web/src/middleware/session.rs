//! Session middleware configuration.
//!
//! Sets up signed-cookie sessions using tower-sessions. Production uses the
//! `PostgreSQL` store; tests plug in `MemoryStore`.

use secrecy::ExposeSecret;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "purbeurre_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session secret could not be turned into a signing key.
#[derive(Debug, thiserror::Error)]
#[error("session secret is not a valid signing key: {0}")]
pub struct SessionKeyError(#[from] tower_sessions::cookie::KeyError);

/// Create the session layer around `store`.
///
/// Cookies are signed with `PURBEURRE_SESSION_SECRET` and marked `Secure`
/// when the site is served over HTTPS.
///
/// # Errors
///
/// Returns `SessionKeyError` if the secret is shorter than 64 bytes.
pub fn create_session_layer<S>(
    store: S,
    config: &WebConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
