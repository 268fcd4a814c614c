//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::backend::types::Product;
use crate::error::Result;
use crate::filters;
use crate::middleware::{load_backend_cookies, save_backend_cookies};
use crate::services::cart;
use crate::state::AppState;

/// How many products the home page highlights.
const HIGHLIGHT_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub highlights: Vec<Product>,
    pub cart_count: u32,
}

/// Display the home page with a few product highlights.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let mut jar = load_backend_cookies(&session).await?;

    // The home page survives a dead backend; it just has nothing to show.
    let highlights = match state.catalog_products(&mut jar).await {
        Ok(products) => products.iter().take(HIGHLIGHT_COUNT).cloned().collect(),
        Err(err) => {
            warn!(error = %err, "product highlights unavailable");
            Vec::new()
        }
    };
    save_backend_cookies(&session, &jar).await?;

    let cart_count = cart::cached_count(&session).await?;

    Ok(HomeTemplate {
        highlights,
        cart_count,
    })
}
