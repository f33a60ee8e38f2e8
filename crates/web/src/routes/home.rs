//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use super::PageContext;
use crate::filters;
use crate::middleware::{Flash, OptionalAuth};

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
}

/// Display the landing page with the product search form.
pub async fn home(OptionalAuth(user): OptionalAuth, flash: Flash) -> impl IntoResponse {
    HomeTemplate {
        ctx: PageContext::new(user, flash.take().await),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{body_text, get, test_app};

    #[tokio::test]
    async fn test_home_renders_search_form() {
        let response = get(test_app(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains(r#"action="/replace""#));
        assert!(body.contains(r#"name="query""#));
        assert!(body.contains("/login"));
    }
}
