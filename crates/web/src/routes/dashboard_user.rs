//! User dashboard route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireUser, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::routes::cart::CartView;
use crate::services::cart;
use crate::state::AppState;

/// User dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard_user/index.html")]
pub struct UserDashboardTemplate {
    pub user: CurrentUser,
    pub cart: CartView,
    pub cart_count: u32,
}

/// Account overview with a cart summary.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<UserDashboardTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let cart = match state.backend().cart_items(&mut jar).await {
        Ok(items) => CartView::from(items),
        Err(err) => {
            tracing::warn!(error = %err, "cart summary unavailable");
            CartView::empty()
        }
    };
    save_backend_cookies(&session, &jar).await?;

    Ok(UserDashboardTemplate {
        user,
        cart,
        cart_count: cart::cached_count(&session).await?,
    })
}
