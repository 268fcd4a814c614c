//! Session-related types.
//!
//! The session never caches account identity; it holds only the backend
//! cookie jar and the last-seen cart count. Who the user is gets decided
//! per request by asking the backend.

use serde::{Deserialize, Serialize};

use shopwright_core::{AccountStatus, Role, UserId};

use crate::backend::types::ApiUser;

/// The authenticated account for the current request.
///
/// Built from a fresh `GET /api/user` by the route gate and stored in
/// request extensions, never in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub verified: bool,
}

impl CurrentUser {
    /// Path of this account's dashboard landing page.
    #[must_use]
    pub fn dashboard_path(&self) -> &'static str {
        self.role.dashboard_prefix()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<ApiUser> for CurrentUser {
    fn from(user: ApiUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            verified: user.email_verified_at.is_some(),
        }
    }
}

/// Session keys.
pub mod session_keys {
    /// Key for the backend cookie jar.
    pub const BACKEND_COOKIES: &str = "backend_cookies";

    /// Key for the last successfully fetched cart count.
    pub const CART_COUNT: &str = "cart_count";
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopwright_core::UserId;

    fn api_user(role: Role, verified: bool) -> ApiUser {
        ApiUser {
            id: UserId::new(7),
            name: "Robin".to_string(),
            email: "robin@example.com".to_string(),
            role,
            status: AccountStatus::Active,
            email_verified_at: verified.then(chrono::Utc::now),
        }
    }

    #[test]
    fn test_dashboard_path_follows_role() {
        let admin = CurrentUser::from(api_user(Role::Admin, true));
        assert_eq!(admin.dashboard_path(), "/dashboard_admin");
        assert!(admin.is_admin());

        let user = CurrentUser::from(api_user(Role::User, true));
        assert_eq!(user.dashboard_path(), "/dashboard_user");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_verified_derives_from_timestamp() {
        assert!(CurrentUser::from(api_user(Role::User, true)).verified);
        assert!(!CurrentUser::from(api_user(Role::User, false)).verified);
    }
}
