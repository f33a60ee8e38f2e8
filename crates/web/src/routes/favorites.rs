//! Favorite route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, header::REFERER},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use purbeurre_core::{Page, PageRequest};

use super::PageContext;
use super::products::parse_product_id;
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, FlashLevel, RequireAuth, local_referer};
use crate::models::Product;
use crate::services::FavoriteService;
use crate::services::favorites::{AddOutcome, RemoveOutcome};
use crate::state::AppState;

/// Where add/remove land when there is no usable referring page.
pub const FAVORITES_PATH: &str = "/favorite";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Favorites list template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites/index.html")]
pub struct FavoritesTemplate {
    pub ctx: PageContext,
    pub favorites: Page<Product>,
}

/// List the user's favorites, six per page.
#[instrument(skip(state, flash, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    let page = PageRequest::parse(query.page.as_deref());
    let favorites = FavoriteService::new(state.pool()).list(user.id, page).await?;

    Ok(FavoritesTemplate {
        ctx: PageContext::new(Some(user), flash.take().await),
        favorites,
    }
    .into_response())
}

/// Bookmark a product, then go back to the page the form was on.
#[instrument(skip(state, flash, user, headers))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let product_id = parse_product_id(&id)?;

    let outcome = FavoriteService::new(state.pool())
        .add(user.id, product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {product_id}")),
            other => AppError::Database(other),
        })?;

    match outcome {
        AddOutcome::Added => {
            flash
                .push(FlashLevel::Success, "Le produit a été ajouté à vos favoris.")
                .await?;
        }
        AddOutcome::AlreadyFavorite => {
            flash
                .push(FlashLevel::Info, "Ce produit est déjà dans vos favoris.")
                .await?;
        }
    }

    let referer = headers.get(REFERER).and_then(|v| v.to_str().ok());
    let target = local_referer(referer, &state.config().base_url)
        .unwrap_or_else(|| FAVORITES_PATH.to_owned());

    Ok(Redirect::to(&target).into_response())
}

/// Remove a bookmark and return to the favorites list.
#[instrument(skip(state, flash, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Response> {
    let product_id = parse_product_id(&id)?;

    match FavoriteService::new(state.pool())
        .remove(user.id, product_id)
        .await?
    {
        RemoveOutcome::Removed => {
            flash
                .push(FlashLevel::Success, "Le produit a été retiré de vos favoris.")
                .await?;
        }
        RemoveOutcome::NotFavorite => {
            flash
                .push(FlashLevel::Info, "Ce produit n'est pas dans vos favoris.")
                .await?;
        }
    }

    Ok(Redirect::to(FAVORITES_PATH).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::routes::test_support::{
        get, location, login_cookie, post_form, post_form_with_cookie, test_app,
        test_app_with_login,
    };

    #[tokio::test]
    async fn test_favorite_list_requires_login() {
        let response = get(test_app(), "/favorite?page=2").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Ffavorite%3Fpage%3D2");
    }

    #[tokio::test]
    async fn test_add_favorite_login_returns_to_product_page() {
        let request = Request::builder()
            .method("POST")
            .uri("/add_favorite/3")
            .header(header::REFERER, "http://localhost:8000/detail/3")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Fdetail%2F3");
    }

    #[tokio::test]
    async fn test_add_favorite_login_without_referer_returns_home() {
        let response = post_form(test_app(), "/add_favorite/3", "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2F");
    }

    #[tokio::test]
    async fn test_del_favorite_requires_login() {
        let response = post_form(test_app(), "/del_favorite/3", "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2F");
    }

    #[tokio::test]
    async fn test_add_favorite_with_bad_id_is_404() {
        let app = test_app_with_login();
        let cookie = login_cookie(&app).await;

        let response = post_form_with_cookie(app, "/add_favorite/abc", "", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
