//! Admin user-management table route handlers.
//!
//! Role and status changes are destructive for the affected account, so the
//! table's controls carry `hx-confirm` and the row only changes once the
//! backend has accepted the update.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopwright_core::{AccountStatus, Role, UserId};

use crate::backend::types::{ManagedUser, ManagedUserUpdate};
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireUser, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::services::cart;
use crate::state::AppState;

use super::{ToastTemplate, products::mutation_failure};

/// Role/status change form data.
#[derive(Debug, Deserialize)]
pub struct ManagedUserForm {
    pub role: Role,
    pub status: AccountStatus,
}

/// User management table page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard_admin/users.html")]
pub struct AdminUsersTemplate {
    pub user: CurrentUser,
    pub accounts: Vec<ManagedUser>,
    pub cart_count: u32,
    /// Row partial scope; pages render without one.
    pub toast: Option<String>,
}

/// One account row, with an out-of-band toast on mutation success.
#[derive(Template, WebTemplate)]
#[template(path = "partials/admin_user_row.html")]
pub struct UserRowTemplate {
    pub account: ManagedUser,
    pub current_user_id: UserId,
    pub toast: Option<String>,
}

/// Account table page, always from a fresh backend fetch.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<AdminUsersTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let accounts = state.backend().managed_users(&mut jar).await?;
    save_backend_cookies(&session, &jar).await?;

    Ok(AdminUsersTemplate {
        user,
        accounts,
        cart_count: cart::cached_count(&session).await?,
        toast: None,
    })
}

/// Change an account's role and status (HTMX). Responds with the updated row.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<UserId>,
    Form(form): Form<ManagedUserForm>,
) -> Result<Response> {
    if id == user.id && (form.role != user.role || form.status == AccountStatus::Inactive) {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            "You cannot demote or deactivate your own account".to_string(),
        )
            .into_response());
    }

    let mut jar = load_backend_cookies(&session).await?;
    let update = ManagedUserUpdate {
        role: Some(form.role),
        status: Some(form.status),
    };
    let result = state.backend().update_managed_user(&mut jar, id, &update).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(account) => Ok(UserRowTemplate {
            account,
            current_user_id: user.id,
            toast: Some("Account updated".to_string()),
        }
        .into_response()),
        Err(err) => Ok(mutation_failure(&err)),
    }
}

/// Delete an account (HTMX). An empty body removes the row.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<UserId>,
) -> Result<Response> {
    if id == user.id {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            "You cannot delete your own account".to_string(),
        )
            .into_response());
    }

    let mut jar = load_backend_cookies(&session).await?;
    let result = state.backend().delete_managed_user(&mut jar, id).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => Ok(ToastTemplate {
            message: "Account deleted".to_string(),
        }
        .into_response()),
        Err(err) => Ok(mutation_failure(&err)),
    }
}
