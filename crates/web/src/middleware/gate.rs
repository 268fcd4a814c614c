//! Route gates: per-namespace authentication and redirection rules.
//!
//! Every gated request asks the backend who the caller is, then runs the
//! pure [`evaluate`] function to decide whether to serve the page, redirect,
//! or tear the session down. Identity is never cached in the session, so a
//! role or status change on the backend takes effect on the next request.
//!
//! The decision rules, in order:
//!
//! - A protected page with no backend session, or whose identity fetch
//!   fails, clears the local session and lands on `/login`.
//! - An inactive account is confined to `/inactiveaccount`.
//! - An unverified account is confined to `/verify-email`.
//! - A role-gated page redirects other roles to their own dashboard; when
//!   that redirect could not help (the caller is already inside their own
//!   dashboard), the request is denied outright.
//! - A guest page that opts in sends authenticated callers to wherever
//!   their account state belongs.
//! - A redirect that targets the current path is served instead, so the
//!   gate can never loop.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use shopwright_core::Role;

use crate::backend::BackendError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::session::{clear_backend_cookies, load_backend_cookies, save_backend_cookies};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Pages an account can be confined to while in a limbo state.
const INACTIVE_PATH: &str = "/inactiveaccount";
const VERIFY_PATH: &str = "/verify-email";
const LOGIN_PATH: &str = "/login";
const ACCESS_DENIED_PATH: &str = "/access-denied";

/// Access rule for a route namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Pages that work without a backend session.
    ///
    /// With `redirect_if_authenticated`, signed-in callers are sent to
    /// wherever their account state belongs (login and register pages).
    Guest { redirect_if_authenticated: bool },
    /// Pages that require a backend session, optionally a specific role.
    Auth { role: Option<Role> },
}

/// Outcome of the backend identity fetch, as seen by [`evaluate`].
#[derive(Debug, Clone)]
pub enum UserFetch {
    /// The backend returned an account.
    User(CurrentUser),
    /// The backend refused with a verification conflict.
    Unverified,
    /// No backend session.
    Unauthenticated,
    /// The fetch failed (network, backend down, malformed response).
    Failed,
}

/// What the gate decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Serve the page.
    Allow,
    /// Send the caller elsewhere.
    RedirectTo(String),
    /// Tear down the local session and send the caller to the login page.
    LogoutAndLogin,
    /// The caller's role can never reach this page.
    Denied,
}

/// Where an account in a given state belongs.
///
/// Used both by the gate and by the login route to pick the post-login
/// destination.
#[must_use]
pub fn destination_for(user: &CurrentUser) -> &'static str {
    if user.status == shopwright_core::AccountStatus::Inactive {
        INACTIVE_PATH
    } else if !user.verified {
        VERIFY_PATH
    } else {
        user.dashboard_path()
    }
}

/// Decide what to do with a request.
///
/// Pure function of the gate, the request path, and the identity fetch
/// outcome. A redirect that targets `path` itself collapses to `Allow`.
#[must_use]
pub fn evaluate(gate: Gate, path: &str, fetch: &UserFetch) -> Verdict {
    let verdict = match gate {
        Gate::Guest {
            redirect_if_authenticated,
        } => match fetch {
            UserFetch::User(user) if redirect_if_authenticated => {
                Verdict::RedirectTo(destination_for(user).to_string())
            }
            UserFetch::Unverified if redirect_if_authenticated => {
                Verdict::RedirectTo(VERIFY_PATH.to_string())
            }
            _ => Verdict::Allow,
        },
        Gate::Auth { role } => match fetch {
            UserFetch::Unauthenticated | UserFetch::Failed => Verdict::LogoutAndLogin,
            UserFetch::Unverified => Verdict::RedirectTo(VERIFY_PATH.to_string()),
            UserFetch::User(user) => evaluate_user(role, path, user),
        },
    };

    // Loop guard: never redirect a page to itself.
    match verdict {
        Verdict::RedirectTo(target) if target == path => Verdict::Allow,
        other => other,
    }
}

fn evaluate_user(required_role: Option<Role>, path: &str, user: &CurrentUser) -> Verdict {
    if user.status == shopwright_core::AccountStatus::Inactive {
        return Verdict::RedirectTo(INACTIVE_PATH.to_string());
    }
    if !user.verified {
        return Verdict::RedirectTo(VERIFY_PATH.to_string());
    }
    if let Some(required) = required_role {
        if user.role != required {
            // Redirecting into the caller's own dashboard only helps when
            // they are not already inside it.
            if path.starts_with(user.dashboard_path()) {
                return Verdict::Denied;
            }
            return Verdict::RedirectTo(user.dashboard_path().to_string());
        }
    }
    // An active, verified account has no business on the limbo pages.
    if path == INACTIVE_PATH || path == VERIFY_PATH {
        return Verdict::RedirectTo(user.dashboard_path().to_string());
    }
    Verdict::Allow
}

/// Gate middleware. Attach per route namespace with
/// `middleware::from_fn_with_state((state, gate), gate_middleware)`.
pub async fn gate_middleware(
    State((state, gate)): State<(AppState, Gate)>,
    session: Session,
    // Nested routers strip their prefix from `request.uri()`.
    OriginalUri(uri): OriginalUri,
    mut request: Request,
    next: Next,
) -> Response {
    let path = uri.path().to_string();

    let mut jar = match load_backend_cookies(&session).await {
        Ok(jar) => jar,
        Err(err) => return crate::error::AppError::Session(err).into_response(),
    };

    let fetch = match state.backend().current_user(&mut jar).await {
        Ok(user) => UserFetch::User(user.into()),
        Err(BackendError::Unauthenticated) => UserFetch::Unauthenticated,
        Err(BackendError::Conflict { .. }) => UserFetch::Unverified,
        Err(err) => {
            debug!(error = %err, "identity fetch failed");
            UserFetch::Failed
        }
    };

    // The backend may have rotated cookies even on a failed fetch.
    if let Err(err) = save_backend_cookies(&session, &jar).await {
        return crate::error::AppError::Session(err).into_response();
    }

    match evaluate(gate, &path, &fetch) {
        Verdict::Allow => {
            if let UserFetch::User(user) = fetch {
                set_sentry_user(&user.id, Some(&user.email));
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        Verdict::RedirectTo(target) => Redirect::to(&target).into_response(),
        Verdict::LogoutAndLogin => {
            if let Err(err) = clear_backend_cookies(&session).await {
                return crate::error::AppError::Session(err).into_response();
            }
            clear_sentry_user();
            Redirect::to(LOGIN_PATH).into_response()
        }
        Verdict::Denied => Redirect::to(ACCESS_DENIED_PATH).into_response(),
    }
}

/// Extractor for the account the gate attached to the request.
///
/// Only valid behind a `Gate::Auth` namespace; elsewhere it rejects with
/// 401 rather than silently serving an anonymous page.
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Extractor for the account when one happens to be signed in.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
