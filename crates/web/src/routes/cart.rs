//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives on the backend; these handlers relay mutations and
//! render fragments. Mutating responses carry `HX-Trigger: cart-updated`,
//! which the layout listens to for refreshing the navbar badge.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopwright_core::{CartItemId, Price, ProductId};

use crate::backend::types::{CartItem, NewCartItem};
use crate::error::Result;
use crate::filters;
use crate::middleware::{load_backend_cookies, save_backend_cookies};
use crate::services::cart;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: CartItemId,
    pub name: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: Price,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            subtotal: Price::default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<CartItem>> for CartView {
    fn from(items: Vec<CartItem>) -> Self {
        let lines: Vec<CartLineView> = items
            .into_iter()
            .map(|item| CartLineView {
                id: item.id,
                name: item.product_name,
                category: item.category_name,
                quantity: item.quantity,
                price: item.price,
                line_total: item.price.times(item.quantity),
            })
            .collect();
        let subtotal = lines.iter().map(|line| line.line_total).sum();
        Self { lines, subtotal }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart_count: u32,
}

/// Display the cart page.
///
/// A failed fetch renders an empty cart rather than an error page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let cart = match state.backend().cart_items(&mut jar).await {
        Ok(items) => CartView::from(items),
        Err(err) => {
            tracing::warn!(error = %err, "cart fetch failed, rendering empty");
            CartView::empty()
        }
    };
    save_backend_cookies(&session, &jar).await?;

    let cart_count = cart::cached_count(&session).await?;

    Ok(CartShowTemplate { cart, cart_count })
}

/// Add item to cart (HTMX).
///
/// Returns the refreshed badge fragment plus an `HX-Trigger` so other
/// listeners can refresh themselves.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let mut jar = match load_backend_cookies(&session).await {
        Ok(jar) => jar,
        Err(err) => return crate::error::AppError::Session(err).into_response(),
    };

    let item = NewCartItem {
        product_id: form.product_id,
        quantity: form.quantity.unwrap_or(1),
    };

    let result = state.backend().add_cart_item(&mut jar, &item).await;
    if let Err(err) = save_backend_cookies(&session, &jar).await {
        return crate::error::AppError::Session(err).into_response();
    }

    match result {
        Ok(_) => {
            let cart_count = cart::refresh_count(&state, &session, &mut jar)
                .await
                .unwrap_or(0);
            let _ = save_backend_cookies(&session, &jar).await;
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { cart_count },
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "add to cart failed");
            (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"error\">Could not add to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Update cart line quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;

    let result = state
        .backend()
        .update_cart_item(&mut jar, form.item_id, form.quantity)
        .await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(_) => Ok(refetched_items(&state, &session).await?),
        Err(err) => {
            // Leave the rendered cart alone; the next refetch is truth.
            tracing::error!(error = %err, "cart update failed");
            Ok(StatusCode::BAD_GATEWAY.into_response())
        }
    }
}

/// Remove a cart line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut jar = load_backend_cookies(&session).await?;

    let result = state.backend().remove_cart_item(&mut jar, form.item_id).await;
    save_backend_cookies(&session, &jar).await?;

    match result {
        Ok(()) => Ok(refetched_items(&state, &session).await?),
        Err(err) => {
            tracing::error!(error = %err, "cart remove failed");
            Ok(StatusCode::BAD_GATEWAY.into_response())
        }
    }
}

/// Cart count badge fragment.
///
/// Refreshes from the backend; any failure shows zero.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let mut jar = load_backend_cookies(&session).await?;
    let cart_count = cart::refresh_count(&state, &session, &mut jar).await?;
    save_backend_cookies(&session, &jar).await?;
    Ok(CartCountTemplate { cart_count })
}

/// Re-render the cart items fragment from a fresh backend fetch.
async fn refetched_items(state: &AppState, session: &Session) -> Result<Response> {
    let mut jar = load_backend_cookies(session).await?;
    let cart = match state.backend().cart_items(&mut jar).await {
        Ok(items) => CartView::from(items),
        Err(_) => CartView::empty(),
    };
    save_backend_cookies(session, &jar).await?;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response())
}
