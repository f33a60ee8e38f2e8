//! Static page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use super::PageContext;
use crate::filters;
use crate::middleware::{Flash, OptionalAuth};

/// Legal notice page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/legal_notice.html")]
pub struct LegalNoticeTemplate {
    pub ctx: PageContext,
}

/// Display the legal notice.
pub async fn legal_notice(OptionalAuth(user): OptionalAuth, flash: Flash) -> impl IntoResponse {
    LegalNoticeTemplate {
        ctx: PageContext::new(user, flash.take().await),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{body_text, get, test_app};

    #[tokio::test]
    async fn test_legal_notice() {
        let response = get(test_app(), "/legal_notice").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Mentions légales"));
    }
}
