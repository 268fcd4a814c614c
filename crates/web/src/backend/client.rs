//! The backend HTTP client.
//!
//! One `reqwest::Client` is shared by every request; credentials travel in the
//! caller's [`CookieJar`]. Mutating calls are CSRF-primed first: the backend
//! hands out an `XSRF-TOKEN` cookie from `/sanctum/csrf-cookie` and expects
//! its decoded value back in the `X-XSRF-TOKEN` header.
//!
//! There are no retries, timeouts, or backoff here; a failed call rejects and
//! the caller decides what that means.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use shopwright_core::{CartItemId, CategoryId, ProductId, UserId};

use super::cookies::CookieJar;
use super::error::BackendError;
use super::types::{
    ApiUser, CartCount, CartItem, Category, CategoryPayload, LoginPayload, ManagedUser,
    ManagedUserUpdate, NewCartItem, Product, ProductPayload, RegisterPayload, VerificationStatus,
};

/// Client for the remote REST backend.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client for the given origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // The backend only applies its JSON/419 error behavior to XHR-shaped
        // requests.
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The configured backend origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a GET, folding response cookies back into the jar.
    async fn get(&self, jar: &mut CookieJar, path: &str) -> Result<reqwest::Response, BackendError> {
        let mut request = self.client.get(self.url(path));
        if let Some(cookies) = jar.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        let response = request.send().await?;
        jar.absorb(response.headers());
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::from_response(response).await)
        }
    }

    /// Send a CSRF-primed mutating request with a JSON body.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        jar: &mut CookieJar,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, BackendError> {
        let token = self.ensure_csrf(jar).await?;
        let mut request = self
            .client
            .request(method, self.url(path))
            .header("X-XSRF-TOKEN", token)
            .json(body);
        if let Some(cookies) = jar.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        let response = request.send().await?;
        jar.absorb(response.headers());
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::from_response(response).await)
        }
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }

    // =========================================================================
    // CSRF
    // =========================================================================

    /// Fetch the CSRF cookie from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the priming request fails.
    #[instrument(skip(self, jar))]
    pub async fn prime_csrf(&self, jar: &mut CookieJar) -> Result<(), BackendError> {
        self.get(jar, "/sanctum/csrf-cookie").await?;
        debug!("CSRF cookie primed");
        Ok(())
    }

    /// Return the decoded XSRF token, priming the jar first if needed.
    async fn ensure_csrf(&self, jar: &mut CookieJar) -> Result<String, BackendError> {
        if let Some(token) = jar.xsrf_token() {
            return Ok(token);
        }
        self.prime_csrf(jar).await?;
        jar.xsrf_token()
            .ok_or_else(|| BackendError::Parse("backend did not set an XSRF-TOKEN cookie".into()))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Fetch the authenticated account.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when no backend session exists, `Conflict` when the
    /// account's email is unverified, or any transport/API error.
    #[instrument(skip(self, jar))]
    pub async fn current_user(&self, jar: &mut CookieJar) -> Result<ApiUser, BackendError> {
        let response = self.get(jar, "/api/user").await?;
        Self::json(response).await
    }

    /// Authenticate with email and password.
    ///
    /// On success the jar carries the backend session cookie.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload), fields(email = %payload.email))]
    pub async fn login(
        &self,
        jar: &mut CookieJar,
        payload: &LoginPayload,
    ) -> Result<(), BackendError> {
        self.send_json(jar, reqwest::Method::POST, "/login", payload)
            .await?;
        Ok(())
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload), fields(email = %payload.email))]
    pub async fn register(
        &self,
        jar: &mut CookieJar,
        payload: &RegisterPayload,
    ) -> Result<(), BackendError> {
        self.send_json(jar, reqwest::Method::POST, "/register", payload)
            .await?;
        Ok(())
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers treat this as best
    /// effort and clear their jar regardless.
    #[instrument(skip(self, jar))]
    pub async fn logout(&self, jar: &mut CookieJar) -> Result<(), BackendError> {
        self.send_json(jar, reqwest::Method::POST, "/logout", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    /// Ask the backend to resend the verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn resend_verification(&self, jar: &mut CookieJar) -> Result<String, BackendError> {
        let response = self
            .send_json(
                jar,
                reqwest::Method::POST,
                "/email/verification-notification",
                &serde_json::json!({}),
            )
            .await?;
        let status: VerificationStatus = Self::json(response).await?;
        Ok(status.status)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn products(&self, jar: &mut CookieJar) -> Result<Vec<Product>, BackendError> {
        let response = self.get(jar, "/api/products").await?;
        Self::json(response).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload), fields(name = %payload.name))]
    pub async fn create_product(
        &self,
        jar: &mut CookieJar,
        payload: &ProductPayload,
    ) -> Result<Product, BackendError> {
        let response = self
            .send_json(jar, reqwest::Method::POST, "/api/products", payload)
            .await?;
        Self::json(response).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload))]
    pub async fn update_product(
        &self,
        jar: &mut CookieJar,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, BackendError> {
        let response = self
            .send_json(
                jar,
                reqwest::Method::PUT,
                &format!("/api/products/{id}"),
                payload,
            )
            .await?;
        Self::json(response).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the product then still exists.
    #[instrument(skip(self, jar))]
    pub async fn delete_product(
        &self,
        jar: &mut CookieJar,
        id: ProductId,
    ) -> Result<(), BackendError> {
        self.send_json(
            jar,
            reqwest::Method::DELETE,
            &format!("/api/products/{id}"),
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    /// Fetch all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn categories(&self, jar: &mut CookieJar) -> Result<Vec<Category>, BackendError> {
        let response = self.get(jar, "/api/categories").await?;
        Self::json(response).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload), fields(title = %payload.title))]
    pub async fn create_category(
        &self,
        jar: &mut CookieJar,
        payload: &CategoryPayload,
    ) -> Result<Category, BackendError> {
        let response = self
            .send_json(jar, reqwest::Method::POST, "/api/categories", payload)
            .await?;
        Self::json(response).await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// `Validation` on a 422, or any transport/API error.
    #[instrument(skip(self, jar, payload))]
    pub async fn update_category(
        &self,
        jar: &mut CookieJar,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> Result<Category, BackendError> {
        let response = self
            .send_json(
                jar,
                reqwest::Method::PUT,
                &format!("/api/categories/{id}"),
                payload,
            )
            .await?;
        Self::json(response).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn delete_category(
        &self,
        jar: &mut CookieJar,
        id: CategoryId,
    ) -> Result<(), BackendError> {
        self.send_json(
            jar,
            reqwest::Method::DELETE,
            &format!("/api/categories/{id}"),
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // User management
    // =========================================================================

    /// Fetch every account for the management table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn managed_users(&self, jar: &mut CookieJar) -> Result<Vec<ManagedUser>, BackendError> {
        let response = self.get(jar, "/api/mgt-user").await?;
        Self::json(response).await
    }

    /// Change an account's role and/or status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the account is then unchanged.
    #[instrument(skip(self, jar, update))]
    pub async fn update_managed_user(
        &self,
        jar: &mut CookieJar,
        id: UserId,
        update: &ManagedUserUpdate,
    ) -> Result<ManagedUser, BackendError> {
        // The backend routes user updates through this path shape.
        let response = self
            .send_json(
                jar,
                reqwest::Method::PUT,
                &format!("/api/mgt-user/update-on-id={id}"),
                update,
            )
            .await?;
        Self::json(response).await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn delete_managed_user(
        &self,
        jar: &mut CookieJar,
        id: UserId,
    ) -> Result<(), BackendError> {
        self.send_json(
            jar,
            reqwest::Method::DELETE,
            &format!("/api/mgt-user/update-on-id={id}"),
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the session's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn cart_items(&self, jar: &mut CookieJar) -> Result<Vec<CartItem>, BackendError> {
        let response = self.get(jar, "/api/cart-items").await?;
        Self::json(response).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn add_cart_item(
        &self,
        jar: &mut CookieJar,
        item: &NewCartItem,
    ) -> Result<CartItem, BackendError> {
        let response = self
            .send_json(jar, reqwest::Method::POST, "/api/cart-items", item)
            .await?;
        Self::json(response).await
    }

    /// Change a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn update_cart_item(
        &self,
        jar: &mut CookieJar,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        let response = self
            .send_json(
                jar,
                reqwest::Method::PUT,
                &format!("/api/cart-items/{id}"),
                &serde_json::json!({ "quantity": quantity }),
            )
            .await?;
        Self::json(response).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn remove_cart_item(
        &self,
        jar: &mut CookieJar,
        id: CartItemId,
    ) -> Result<(), BackendError> {
        self.send_json(
            jar,
            reqwest::Method::DELETE,
            &format!("/api/cart-items/{id}"),
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    /// Fetch the cart item count for the badge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the badge treats any failure
    /// as a count of zero.
    #[instrument(skip(self, jar))]
    pub async fn cart_count(&self, jar: &mut CookieJar) -> Result<u32, BackendError> {
        let response = self.get(jar, "/api/cart/count").await?;
        let count: CartCount = Self::json(response).await?;
        Ok(count.count)
    }
}
