//! Account role and status enums.
//!
//! Both values are assigned by the backend; the frontend only reads them to
//! decide which dashboard namespace a viewer belongs in and whether the
//! account is allowed past the inactive-account page.

use serde::{Deserialize, Serialize};

/// Account role with different dashboard namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to the admin dashboard (`/dashboard_admin`).
    Admin,
    /// Regular customer account (`/dashboard_user`).
    User,
}

impl Role {
    /// The dashboard path prefix this role is confined to.
    #[must_use]
    pub const fn dashboard_prefix(self) -> &'static str {
        match self {
            Self::Admin => "/dashboard_admin",
            Self::User => "/dashboard_user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Account status assigned by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    /// Deactivated accounts are routed to the inactive-account page.
    Inactive,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid account status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_role_display_from_str_roundtrip() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_from_str_invalid() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_dashboard_prefix() {
        assert_eq!(Role::Admin.dashboard_prefix(), "/dashboard_admin");
        assert_eq!(Role::User.dashboard_prefix(), "/dashboard_user");
    }

    #[test]
    fn test_status_serde() {
        let status: AccountStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, AccountStatus::Inactive);
        assert_eq!(AccountStatus::default(), AccountStatus::Active);
    }
}
