//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::backend::types::{Category, Product};
use crate::backend::{BackendClient, BackendError, CookieJar};
use crate::config::AppConfig;

/// How long public catalog pages may serve a cached backend response.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    backend: BackendClient,
    product_cache: Cache<(), Arc<Vec<Product>>>,
    category_cache: Cache<(), Arc<Vec<Category>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client fails to build.
    pub fn new(config: AppConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend_base_url)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                product_cache: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(CATALOG_TTL)
                    .build(),
                category_cache: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(CATALOG_TTL)
                    .build(),
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Products for public catalog pages, served from a short-lived cache.
    ///
    /// Dashboard views must not use this; they always fetch fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache is cold and the backend fetch fails.
    pub async fn catalog_products(
        &self,
        jar: &mut CookieJar,
    ) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(products) = self.inner.product_cache.get(&()).await {
            return Ok(products);
        }
        let products = Arc::new(self.inner.backend.products(jar).await?);
        self.inner.product_cache.insert((), products.clone()).await;
        Ok(products)
    }

    /// Categories for public catalog pages, served from a short-lived cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache is cold and the backend fetch fails.
    pub async fn catalog_categories(
        &self,
        jar: &mut CookieJar,
    ) -> Result<Arc<Vec<Category>>, BackendError> {
        if let Some(categories) = self.inner.category_cache.get(&()).await {
            return Ok(categories);
        }
        let categories = Arc::new(self.inner.backend.categories(jar).await?);
        self.inner
            .category_cache
            .insert((), categories.clone())
            .await;
        Ok(categories)
    }

    /// Drop cached catalog data after an admin mutation.
    pub async fn invalidate_catalog(&self) {
        self.inner.product_cache.invalidate(&()).await;
        self.inner.category_cache.invalidate(&()).await;
    }
}
