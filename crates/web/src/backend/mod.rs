//! Client for the remote REST backend.
//!
//! Every piece of authoritative state (users, catalog, carts) lives in the
//! backend; this module is the only place that talks to it. Requests are
//! credentialed with the per-browser-session cookie jar and the backend's
//! CSRF double-submit cookie.

mod client;
mod cookies;
mod error;
pub mod types;

pub use client::BackendClient;
pub use cookies::CookieJar;
pub use error::{BackendError, ValidationErrors};
