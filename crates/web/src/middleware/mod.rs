//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions, signed cookie)
//!
//! Rate limiting wraps only the login and registration routes. The
//! [`auth`] and [`flash`] extractors read the session installed by layer 5.

pub mod auth;
pub mod flash;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, local_referer, refresh_current_user, safe_next,
    set_current_user,
};
pub use flash::{Flash, FlashLevel, FlashMessage};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
