//! Product search and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use purbeurre_core::{Page, PageRequest, ProductId};

use super::PageContext;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, FlashLevel, OptionalAuth};
use crate::models::Product;
use crate::services::FavoriteService;
use crate::services::substitutes::{SearchError, SubstituteFinder};
use crate::state::AppState;

/// Shown on the landing page when a search finds nothing.
pub const NO_RESULT_MESSAGE: &str = "Misère de misère, nous n'avons trouvé aucun résultat !";

/// Query parameters for the substitute search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

/// Substitute results template.
#[derive(Template, WebTemplate)]
#[template(path = "products/replace.html")]
pub struct ReplaceTemplate {
    pub ctx: PageContext,
    pub query: String,
    pub reference: Product,
    pub substitutes: Page<Product>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/detail.html")]
pub struct DetailTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub is_favorite: bool,
}

/// Parse a product ID from the path; anything else is a missing product.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

/// Show substitutes for the first product matching `query`.
///
/// A blank query or one that matches nothing sends the visitor back to the
/// landing page with a warning.
#[instrument(skip(state, flash, user))]
pub async fn replace(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
    Query(params): Query<SearchQuery>,
) -> Result<Response> {
    let query = params.query.unwrap_or_default();
    let page = PageRequest::parse(params.page.as_deref());

    let search = match SubstituteFinder::new(state.pool())
        .search(&query, page)
        .await
    {
        Ok(search) => search,
        Err(SearchError::NoProductFound) => {
            flash.push(FlashLevel::Warning, NO_RESULT_MESSAGE).await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ReplaceTemplate {
        ctx: PageContext::new(user, flash.take().await),
        query: query.trim().to_owned(),
        reference: search.reference,
        substitutes: search.substitutes,
    }
    .into_response())
}

/// Show one product with its nutrition label and source link.
#[instrument(skip(state, flash, user))]
pub async fn detail(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_product_id(&id)?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let is_favorite = match &user {
        Some(user) => {
            FavoriteService::new(state.pool())
                .is_favorite(user.id, product.id)
                .await?
        }
        None => false,
    };

    Ok(DetailTemplate {
        ctx: PageContext::new(user, flash.take().await),
        product,
        is_favorite,
    }
    .into_response())
}
