//! Admin product table route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopwright_core::{CategoryId, Price, ProductId};

use crate::backend::BackendError;
use crate::backend::types::{Category, Product, ProductPayload};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireUser, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::services::cart;
use crate::state::AppState;

use super::ToastTemplate;

/// Product form data (create and update share the shape).
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub category_id: CategoryId,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub accessories: String,
}

impl From<ProductForm> for ProductPayload {
    fn from(form: ProductForm) -> Self {
        Self {
            name: form.name,
            price: Price::new(form.price),
            stock: form.stock,
            category_id: Some(form.category_id),
            desc: form.desc,
            color: form.color,
            accessories: form.accessories,
        }
    }
}

/// Product table page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard_admin/products.html")]
pub struct AdminProductsTemplate {
    pub user: CurrentUser,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub cart_count: u32,
    /// Row partial scope; pages render without one.
    pub toast: Option<String>,
}

/// One product row, with an out-of-band toast on mutation success.
#[derive(Template, WebTemplate)]
#[template(path = "partials/admin_product_row.html")]
pub struct ProductRowTemplate {
    pub product: Product,
    pub categories: Vec<Category>,
    pub toast: Option<String>,
}

/// Product table page, always from a fresh backend fetch.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<AdminProductsTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let products = state.backend().products(&mut jar).await?;
    let categories = state.backend().categories(&mut jar).await?;
    save_backend_cookies(&session, &jar).await?;

    Ok(AdminProductsTemplate {
        user,
        products,
        categories,
        cart_count: cart::cached_count(&session).await?,
        toast: None,
    })
}

/// Create a product (HTMX). Responds with the new row.
#[instrument(skip(state, session, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    // The returned row carries the category select, so fetch options up front.
    let categories = state.backend().categories(&mut jar).await.unwrap_or_default();
    let result = state
        .backend()
        .create_product(&mut jar, &form.into())
        .await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(product) => {
            state.invalidate_catalog().await;
            Ok(ProductRowTemplate {
                product,
                categories,
                toast: Some("Product created".to_string()),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Update a product (HTMX). Responds with the updated row.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    let categories = state.backend().categories(&mut jar).await.unwrap_or_default();
    let result = state
        .backend()
        .update_product(&mut jar, id, &form.into())
        .await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(product) => {
            state.invalidate_catalog().await;
            Ok(ProductRowTemplate {
                product,
                categories,
                toast: Some("Product saved".to_string()),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Delete a product (HTMX). An empty body removes the row.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    let result = state.backend().delete_product(&mut jar, id).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => {
            state.invalidate_catalog().await;
            Ok(ToastTemplate {
                message: "Product deleted".to_string(),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Map a failed mutation to an error status with no fragment, so the table
/// stays as it was.
pub(super) fn mutation_failure(err: &BackendError) -> Response {
    tracing::error!(error = %err, "admin mutation failed");
    match err {
        BackendError::Validation(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, errors.message.clone()).into_response()
        }
        BackendError::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, "Please sign in again".to_string()).into_response()
        }
        _ => (
            StatusCode::BAD_GATEWAY,
            "The change was not saved".to_string(),
        )
            .into_response(),
    }
}
