//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page with the search form
//! GET  /replace?query=&page=      - Substitutes for the first matching product
//! GET  /detail/{id}               - Product detail
//! GET  /legal_notice              - Legal notice
//!
//! # Auth
//! GET  /register                  - Registration form
//! POST /register                  - Create account (rate limited)
//! GET  /login?next=               - Login form
//! POST /login                     - Log in (rate limited)
//! GET  /logout                    - Log out
//!
//! # Account (requires auth)
//! GET  /profile                   - Username and email
//! GET  /mail_change               - Email change form
//! POST /mail_change               - Change email
//! GET  /favorite?page=            - Paginated favorites
//! POST /add_favorite/{id}         - Bookmark a product
//! POST /del_favorite/{id}         - Remove a bookmark
//!
//! # Operations
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (database ping)
//! GET  /static/*                  - Static assets
//! ```

pub mod account;
pub mod auth;
pub mod favorites;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::config::WebConfig;
use crate::middleware::{
    FlashMessage, auth_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware, session::SessionKeyError,
};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/web/static";

/// Data every page template needs for the shared layout.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in user, shown in the navigation bar.
    pub user: Option<CurrentUser>,
    /// Flash messages taken from the session for this render.
    pub messages: Vec<FlashMessage>,
}

impl PageContext {
    #[must_use]
    pub const fn new(user: Option<CurrentUser>, messages: Vec<FlashMessage>) -> Self {
        Self { user, messages }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Create the auth routes. Form submissions are rate limited per client IP.
pub fn auth_routes(config: &WebConfig) -> Router<AppState> {
    let limiter = auth_rate_limiter(&config.trusted_proxies);

    Router::new()
        .route(
            "/register",
            post(auth::register)
                .layer(limiter.clone())
                .get(auth::register_page),
        )
        .route(
            "/login",
            post(auth::login).layer(limiter).get(auth::login_page),
        )
        .route("/logout", get(auth::logout))
}

/// Create the account and favorite routes.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route(
            "/mail_change",
            get(account::mail_change_page).post(account::mail_change),
        )
        .route("/favorite", get(favorites::index))
        .route("/add_favorite/{id}", post(favorites::add))
        .route("/del_favorite/{id}", post(favorites::remove))
}

/// Create all page routes.
pub fn routes(config: &WebConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/replace", get(products::replace))
        .route("/detail/{id}", get(products::detail))
        .route("/legal_notice", get(pages::legal_notice))
        .merge(auth_routes(config))
        .merge(account_routes())
}

/// Build the complete application around a session store.
///
/// Sentry layers are added by the binary on top of this router.
///
/// # Errors
///
/// Returns `SessionKeyError` if the configured session secret cannot sign
/// cookies.
pub fn app<S>(state: AppState, store: S) -> Result<Router, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let pages = routes(state.config());
    build(state, store, pages)
}

fn build<S>(state: AppState, store: S, pages: Router<AppState>) -> Result<Router, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(store, state.config())?;

    Ok(Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(pages)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router fixtures for handler tests.
    //!
    //! The pool connects lazily to an address nothing listens on, so only
    //! handlers that return before touching the database can be exercised.

    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use axum::{
        Router,
        extract::ConnectInfo,
        body::{Body, to_bytes},
        http::{Request, Response, header},
    };
    use secrecy::SecretString;
    use purbeurre_core::{Email, UserId, Username};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use crate::config::WebConfig;
    use crate::db::create_lazy_pool;
    use crate::middleware::set_current_user;
    use crate::models::CurrentUser;
    use crate::state::AppState;

    pub fn test_config() -> WebConfig {
        WebConfig {
            database_url: SecretString::from("postgres://nobody@127.0.0.1:1/none"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            base_url: "http://localhost:8000".to_owned(),
            session_secret: SecretString::from(
                "k3J9vQ2mZp8Lr5Tx1Wc7Hn4Bf6Yd0Sg3Ua9Ej2Ko5Mi8Nq1Rt4Vw7Xy0Zb3Cd6Fh9Gj",
            ),
            run_migrations: false,
            trusted_proxies: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn test_state() -> AppState {
        let config = test_config();
        let pool = create_lazy_pool(&config.database_url).unwrap();
        AppState::new(config, pool)
    }

    pub fn test_app() -> Router {
        super::app(test_state(), MemoryStore::default()).unwrap()
    }

    /// The user that `GET /test/login` puts in the session.
    pub fn test_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            username: Username::parse("marie").unwrap(),
            email: Email::parse("marie@example.fr").unwrap(),
        }
    }

    /// The application plus a `GET /test/login` route that logs in
    /// [`test_user`] without touching the database.
    pub fn test_app_with_login() -> Router {
        let login = Router::new().route(
            "/test/login",
            axum::routing::get(|session: Session| async move {
                set_current_user(&session, &test_user()).await.unwrap();
                "ok"
            }),
        );
        let state = test_state();
        let pages = super::routes(state.config()).merge(login);
        super::build(state, MemoryStore::default(), pages).unwrap()
    }

    /// Log in through `/test/login` and return the session cookie.
    pub async fn login_cookie(app: &Router) -> String {
        let response = get(app.clone(), "/test/login").await;
        session_cookie(&response)
    }

    pub async fn get(app: Router, uri: &str) -> Response<Body> {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
        post_form_with_cookie(app, uri, body, None).await
    }

    pub async fn post_form_with_cookie(
        app: Router,
        uri: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .extension(ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 4242))));
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.oneshot(builder.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn location(response: &Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// The `name=value` pair of the session cookie set by `response`.
    pub fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::test_support::{get, test_app};

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = get(test_app(), "/no-such-page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id_and_security_headers() {
        let response = get(test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("content-security-policy"));
    }
}
