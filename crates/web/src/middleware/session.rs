//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. The session carries the
//! backend cookie jar, so losing it on restart just means signing in again.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::backend::CookieJar;
use crate::config::AppConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Secure cookies only when actually served over HTTPS
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the backend cookie jar from the session, empty if absent.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_backend_cookies(
    session: &Session,
) -> Result<CookieJar, tower_sessions::session::Error> {
    Ok(session
        .get::<CookieJar>(session_keys::BACKEND_COOKIES)
        .await?
        .unwrap_or_default())
}

/// Persist the backend cookie jar back into the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_backend_cookies(
    session: &Session,
    jar: &CookieJar,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::BACKEND_COOKIES, jar).await
}

/// Drop the backend cookie jar and cached cart count (logout).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_backend_cookies(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CookieJar>(session_keys::BACKEND_COOKIES)
        .await?;
    session.remove::<u32>(session_keys::CART_COUNT).await?;
    Ok(())
}
