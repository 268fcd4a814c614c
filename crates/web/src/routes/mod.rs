//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (probes the backend)
//!
//! # Storefront (no gate)
//! GET  /products                 - Product listing with add-to-cart
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add to cart (HTMX, triggers cart-updated)
//! POST /cart/update              - Update quantity (HTMX fragment)
//! POST /cart/remove              - Remove item (HTMX fragment)
//! GET  /cart/count               - Cart count badge (fragment)
//! POST /logout                   - Logout action (ungated)
//!
//! # Auth pages (guest gate: authenticated callers get redirected)
//! GET  /login                    - Login page
//! POST /login                    - Login action (422 re-renders inline)
//! GET  /register                 - Register page
//! POST /register                 - Register action
//!
//! # Account limbo pages (auth gate, no role)
//! GET  /verify-email             - Verification prompt
//! POST /verify-email             - Resend verification email
//! GET  /inactiveaccount          - Deactivated-account notice
//! GET  /access-denied            - Role mismatch fallback
//!
//! # User dashboard (auth gate, role user)
//! GET  /dashboard_user           - Account overview with cart summary
//!
//! # Admin dashboard (auth gate, role admin)
//! GET    /dashboard_admin                   - Admin home
//! GET    /dashboard_admin/products          - Product table
//! POST   /dashboard_admin/products          - Create product (HTMX row)
//! PUT    /dashboard_admin/products/{id}     - Update product (HTMX row)
//! DELETE /dashboard_admin/products/{id}     - Delete product
//! GET    /dashboard_admin/categories        - Category table
//! POST   /dashboard_admin/categories        - Create category
//! PUT    /dashboard_admin/categories/{id}   - Update category
//! DELETE /dashboard_admin/categories/{id}   - Delete category
//! GET    /dashboard_admin/mgt-user          - Account table
//! PUT    /dashboard_admin/mgt-user/{id}     - Change role/status
//! DELETE /dashboard_admin/mgt-user/{id}     - Delete account
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard_admin;
pub mod dashboard_user;
pub mod health;
pub mod home;
pub mod products;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use shopwright_core::Role;

use crate::middleware::{Gate, gate_middleware};
use crate::state::AppState;

fn gated(state: &AppState, gate: Gate, router: Router<AppState>) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(
        (state.clone(), gate),
        gate_middleware,
    ))
}

/// Storefront routes, reachable with or without a backend session.
fn storefront_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        // Ungated so inactive and unverified accounts can still get out.
        .route("/logout", post(auth::logout))
}

/// Login and register, gated so signed-in callers bounce to their dashboard.
fn guest_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register));
    gated(
        state,
        Gate::Guest {
            redirect_if_authenticated: true,
        },
        router,
    )
}

/// Pages for accounts in a limbo state, plus logout.
fn account_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route(
            "/verify-email",
            get(auth::verify_email_page).post(auth::resend_verification),
        )
        .route("/inactiveaccount", get(auth::inactive_account_page))
        .route("/access-denied", get(auth::access_denied_page));
    gated(state, Gate::Auth { role: None }, router)
}

fn user_dashboard_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new().route("/dashboard_user", get(dashboard_user::index));
    gated(
        state,
        Gate::Auth {
            role: Some(Role::User),
        },
        router,
    )
}

fn admin_dashboard_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(dashboard_admin::index))
        .route(
            "/products",
            get(dashboard_admin::products::index).post(dashboard_admin::products::create),
        )
        .route(
            "/products/{id}",
            put(dashboard_admin::products::update).delete(dashboard_admin::products::remove),
        )
        .route(
            "/categories",
            get(dashboard_admin::categories::index).post(dashboard_admin::categories::create),
        )
        .route(
            "/categories/{id}",
            put(dashboard_admin::categories::update).delete(dashboard_admin::categories::remove),
        )
        .route("/mgt-user", get(dashboard_admin::users::index))
        .route(
            "/mgt-user/{id}",
            put(dashboard_admin::users::update).delete(dashboard_admin::users::remove),
        );
    Router::new().nest(
        "/dashboard_admin",
        gated(
            state,
            Gate::Auth {
                role: Some(Role::Admin),
            },
            router,
        ),
    )
}

/// Create all application routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(storefront_routes())
        .merge(guest_routes(state))
        .merge(account_routes(state))
        .merge(user_dashboard_routes(state))
        .merge(admin_dashboard_routes(state))
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
}
