//! Domain models shared across route handlers.

mod session;

pub use session::{CurrentUser, session_keys};
