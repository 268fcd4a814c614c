//! Authentication route handlers.
//!
//! Login and register are plain form posts. A 422 from the backend
//! re-renders the form with field errors inline and no redirect; a success
//! leaves the backend session in the jar and redirects to wherever the
//! account's state belongs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::backend::types::{LoginPayload, RegisterPayload};
use crate::backend::{BackendError, ValidationErrors};
use crate::error::{AppError, Result, clear_sentry_user};
use crate::filters;
use crate::middleware::{OptionalUser, destination_for, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::services::cart;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present iff checked.
    pub remember: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub errors: ValidationErrors,
    pub cart_count: u32,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub name: String,
    pub email: String,
    pub errors: ValidationErrors,
    pub cart_count: u32,
}

/// Email verification prompt template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_email.html")]
pub struct VerifyEmailTemplate {
    pub email: Option<String>,
    pub status: Option<String>,
    pub cart_count: u32,
}

/// Deactivated-account notice template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/inactive_account.html")]
pub struct InactiveAccountTemplate {
    pub cart_count: u32,
}

/// Access denied template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/access_denied.html")]
pub struct AccessDeniedTemplate {
    pub dashboard_path: &'static str,
    pub cart_count: u32,
}

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(session: Session) -> Result<LoginTemplate> {
    Ok(LoginTemplate {
        email: String::new(),
        errors: ValidationErrors::default(),
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Handle a login attempt.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;

    let payload = LoginPayload {
        email: form.email.clone(),
        password: form.password,
        remember: form.remember.is_some(),
    };
    let result = state.backend().login(&mut jar, &payload).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => {
            // Warm the badge while we hold the fresh session.
            let _ = cart::refresh_count(&state, &session, &mut jar).await;
            save_backend_cookies(&session, &jar).await?;
            Ok(Redirect::to(post_login_destination(&state, &session).await?.as_str()).into_response())
        }
        Err(BackendError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                email: form.email,
                errors,
                cart_count: cart::cached_count(&session).await?,
            },
        )
            .into_response()),
        Err(err) => Err(AppError::Backend(err)),
    }
}

/// Display the registration page.
#[instrument(skip(session))]
pub async fn register_page(session: Session) -> Result<RegisterTemplate> {
    Ok(RegisterTemplate {
        name: String::new(),
        email: String::new(),
        errors: ValidationErrors::default(),
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Handle a registration attempt.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;

    let payload = RegisterPayload {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password,
        password_confirmation: form.password_confirmation,
    };
    let result = state.backend().register(&mut jar, &payload).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => Ok(Redirect::to(post_login_destination(&state, &session).await?.as_str())
            .into_response()),
        Err(BackendError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            RegisterTemplate {
                name: form.name,
                email: form.email,
                errors,
                cart_count: cart::cached_count(&session).await?,
            },
        )
            .into_response()),
        Err(err) => Err(AppError::Backend(err)),
    }
}

/// Log out: end the backend session (best effort) and flush the local one.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut jar = load_backend_cookies(&session).await?;
    if !jar.is_empty() {
        if let Err(err) = state.backend().logout(&mut jar).await {
            warn!(error = %err, "backend logout failed, clearing local session anyway");
        }
    }
    session.flush().await.map_err(|err| {
        AppError::Internal(format!("session flush failed: {err}"))
    })?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}

/// Display the verify-email prompt.
#[instrument(skip(user, session))]
pub async fn verify_email_page(
    OptionalUser(user): OptionalUser,
    session: Session,
) -> Result<VerifyEmailTemplate> {
    Ok(VerifyEmailTemplate {
        email: user.map(|u| u.email),
        status: None,
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Ask the backend to resend the verification email.
#[instrument(skip(state, user, session))]
pub async fn resend_verification(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
) -> Result<VerifyEmailTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let status = state.backend().resend_verification(&mut jar).await?;
    save_backend_cookies(&session, &jar).await?;

    Ok(VerifyEmailTemplate {
        email: user.map(|u| u.email),
        status: Some(status),
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Display the deactivated-account notice.
#[instrument(skip(session))]
pub async fn inactive_account_page(session: Session) -> Result<InactiveAccountTemplate> {
    Ok(InactiveAccountTemplate {
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Display the access-denied page.
#[instrument(skip(user, session))]
pub async fn access_denied_page(
    OptionalUser(user): OptionalUser,
    session: Session,
) -> Result<AccessDeniedTemplate> {
    let dashboard_path = user.as_ref().map_or("/", CurrentUser::dashboard_path);
    Ok(AccessDeniedTemplate {
        dashboard_path,
        cart_count: cart::cached_count(&session).await?,
    })
}

/// Where a freshly signed-in account belongs.
///
/// Asks the backend who the session now is; a verification conflict lands on
/// the verify page, anything else falls back to the login page.
async fn post_login_destination(state: &AppState, session: &Session) -> Result<String> {
    let mut jar = load_backend_cookies(session).await?;
    let destination = match state.backend().current_user(&mut jar).await {
        Ok(user) => destination_for(&CurrentUser::from(user)).to_string(),
        Err(BackendError::Conflict { .. }) => "/verify-email".to_string(),
        Err(err) => {
            warn!(error = %err, "post-login identity fetch failed");
            "/login".to_string()
        }
    };
    save_backend_cookies(session, &jar).await?;
    Ok(destination)
}
