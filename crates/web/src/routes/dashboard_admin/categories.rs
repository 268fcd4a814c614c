//! Admin category table route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopwright_core::CategoryId;

use crate::backend::types::{Category, CategoryPayload};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireUser, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::services::cart;
use crate::state::AppState;

use super::{ToastTemplate, products::mutation_failure};

/// Category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

impl From<CategoryForm> for CategoryPayload {
    fn from(form: CategoryForm) -> Self {
        Self {
            title: form.title,
            desc: form.desc,
        }
    }
}

/// Category table page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard_admin/categories.html")]
pub struct AdminCategoriesTemplate {
    pub user: CurrentUser,
    pub categories: Vec<Category>,
    pub cart_count: u32,
    /// Row partial scope; pages render without one.
    pub toast: Option<String>,
}

/// One category row, with an out-of-band toast on mutation success.
#[derive(Template, WebTemplate)]
#[template(path = "partials/admin_category_row.html")]
pub struct CategoryRowTemplate {
    pub category: Category,
    pub toast: Option<String>,
}

/// Category table page, always from a fresh backend fetch.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<AdminCategoriesTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let categories = state.backend().categories(&mut jar).await?;
    save_backend_cookies(&session, &jar).await?;

    Ok(AdminCategoriesTemplate {
        user,
        categories,
        cart_count: cart::cached_count(&session).await?,
        toast: None,
    })
}

/// Create a category (HTMX). Responds with the new row.
#[instrument(skip(state, session, form), fields(title = %form.title))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    let result = state.backend().create_category(&mut jar, &form.into()).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(category) => {
            state.invalidate_catalog().await;
            Ok(CategoryRowTemplate {
                category,
                toast: Some("Category created".to_string()),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Update a category (HTMX). Responds with the updated row.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    let result = state
        .backend()
        .update_category(&mut jar, id, &form.into())
        .await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(category) => {
            state.invalidate_catalog().await;
            Ok(CategoryRowTemplate {
                category,
                toast: Some("Category saved".to_string()),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Delete a category (HTMX). An empty body removes the row.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;
    let result = state.backend().delete_category(&mut jar, id).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => {
            state.invalidate_catalog().await;
            Ok(ToastTemplate {
                message: "Category deleted".to_string(),
            }
            .into_response())
        }
        Err(err) => Ok(mutation_failure(&err)),
    }
}
