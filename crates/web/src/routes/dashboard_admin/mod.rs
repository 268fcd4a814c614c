//! Admin dashboard route handlers.
//!
//! Table mutations are HTMX requests. A success responds with the new or
//! updated row plus an out-of-band toast; a failure responds with an error
//! status and no fragment, leaving the table as it was (the layout surfaces
//! the failure from `htmx:responseError`).

pub mod categories;
pub mod products;
pub mod users;

use askama::Template;
use askama_web::WebTemplate;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::services::cart;

/// Out-of-band success toast fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub message: String,
}

/// Admin home template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard_admin/index.html")]
pub struct AdminHomeTemplate {
    pub user: CurrentUser,
    pub cart_count: u32,
}

/// Admin dashboard landing page.
#[instrument(skip(session, user))]
pub async fn index(
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<AdminHomeTemplate> {
    Ok(AdminHomeTemplate {
        user,
        cart_count: cart::cached_count(&session).await?,
    })
}
