//! Cart badge count bookkeeping.
//!
//! The navbar badge shows the last count the backend confirmed. A failed
//! count fetch reads as zero rather than an error page; the badge is
//! cosmetic and must never take a page down with it.

use tower_sessions::Session;
use tracing::warn;

use crate::backend::CookieJar;
use crate::models::session_keys;
use crate::state::AppState;

/// Fetch the cart count from the backend and remember it in the session.
///
/// Any failure maps to a count of zero.
///
/// # Errors
///
/// Returns an error only if the session store fails; backend failures are
/// absorbed.
pub async fn refresh_count(
    state: &AppState,
    session: &Session,
    jar: &mut CookieJar,
) -> Result<u32, tower_sessions::session::Error> {
    let count = match state.backend().cart_count(jar).await {
        Ok(count) => count,
        Err(err) => {
            warn!(error = %err, "cart count fetch failed, showing zero");
            0
        }
    };
    session.insert(session_keys::CART_COUNT, count).await?;
    Ok(count)
}

/// The last count stored in the session, zero if none.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn cached_count(session: &Session) -> Result<u32, tower_sessions::session::Error> {
    Ok(session
        .get::<u32>(session_keys::CART_COUNT)
        .await?
        .unwrap_or(0))
}
