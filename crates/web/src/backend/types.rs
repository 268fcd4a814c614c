//! Wire types for the backend REST API.
//!
//! Field shapes follow the backend's JSON exactly; view structs in the route
//! modules convert these for templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopwright_core::{AccountStatus, CartItemId, CategoryId, Price, ProductId, Role, UserId};

/// The authenticated account, as returned by `GET /api/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    /// `null` until the verification link has been clicked.
    pub email_verified_at: Option<DateTime<Utc>>,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: i64,
    pub category_id: Option<CategoryId>,
    /// Category title, joined in by the backend list endpoint.
    #[serde(default)]
    pub category_title: Option<String>,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub accessories: String,
}

impl Product {
    /// Whether this product belongs to the given category.
    #[must_use]
    pub fn in_category(&self, id: CategoryId) -> bool {
        self.category_id == Some(id)
    }

    /// Whether any stock remains.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub price: Price,
    pub stock: i64,
    pub category_id: Option<CategoryId>,
    pub desc: String,
    pub color: String,
    pub accessories: String,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

/// Payload for creating or updating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub title: String,
    pub desc: String,
}

/// An account row in the user-management list (`GET /api/mgt-user`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
}

impl ManagedUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Partial update for a managed user; only the present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagedUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

/// A line in the session's server-side cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Payload for adding a product to the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Login form payload for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

/// Registration form payload for `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// `GET /api/cart/count` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CartCount {
    pub count: u32,
}

/// `POST /email/verification-notification` body.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationStatus {
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_user_deserialize() {
        let body = r#"{
            "id": 1,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "status": "active",
            "email_verified_at": "2024-05-01T12:00:00Z"
        }"#;
        let user: ApiUser = serde_json::from_str(body).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.email_verified_at.is_some());
    }

    #[test]
    fn test_api_user_unverified() {
        let body = r#"{"id":2,"name":"Bo","email":"bo@example.com","role":"user","status":"active","email_verified_at":null}"#;
        let user: ApiUser = serde_json::from_str(body).unwrap();
        assert!(user.email_verified_at.is_none());
    }

    #[test]
    fn test_managed_user_update_skips_absent_fields() {
        let update = ManagedUserUpdate {
            role: Some(Role::Admin),
            status: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"role":"admin"}"#);
    }

    #[test]
    fn test_product_price_decimal_string() {
        let body = r#"{"id":1,"name":"Lamp","price":"49.90","stock":3,"category_id":2}"#;
        let product: Product = serde_json::from_str(body).unwrap();
        assert_eq!(product.price.display(), "$49.90");
        assert!(product.desc.is_empty());
    }
}
