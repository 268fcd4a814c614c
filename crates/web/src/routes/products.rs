//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::{Category, Product};
use crate::error::Result;
use crate::filters;
use crate::middleware::{load_backend_cookies, save_backend_cookies};
use crate::services::cart;
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub cart_count: u32,
}

/// Display the product catalog with add-to-cart controls.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<ProductsTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let products = state.catalog_products(&mut jar).await?.as_ref().clone();
    let categories = state.catalog_categories(&mut jar).await?.as_ref().clone();
    save_backend_cookies(&session, &jar).await?;

    let cart_count = cart::cached_count(&session).await?;

    Ok(ProductsTemplate {
        products,
        categories,
        cart_count,
    })
}
