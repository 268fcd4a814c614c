//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Route gates (per-namespace authentication rules)

pub mod gate;
pub mod request_id;
pub mod session;

pub use gate::{Gate, OptionalUser, RequireUser, UserFetch, Verdict, destination_for, gate_middleware};
pub use request_id::request_id_middleware;
pub use session::{clear_backend_cookies, create_session_layer, load_backend_cookies, save_backend_cookies};
