use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{
    FALLBACK_STAFF_DISPLAY_NAME, ROLE_ADMIN, ROLE_STAFF, ROLE_SUPER_ADMIN,
};

/// Back-office roles, ordered from lowest to highest precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Staff,
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            ROLE_SUPER_ADMIN => Some(AdminRole::SuperAdmin),
            ROLE_ADMIN => Some(AdminRole::Admin),
            ROLE_STAFF => Some(AdminRole::Staff),
            _ => None,
        }
    }

    /// Label shown to customers next to replies written under this role
    pub fn display_label(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Super Admin",
            AdminRole::Admin => "Admin",
            AdminRole::Staff => "Staff",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(ROLE_SUPER_ADMIN)
    }

    /// super_admin or admin
    pub fn has_admin_access(&self) -> bool {
        self.is_super_admin() || self.has_role(ROLE_ADMIN)
    }

    /// Any back-office role
    pub fn has_staff_access(&self) -> bool {
        self.has_admin_access() || self.has_role(ROLE_STAFF)
    }

    /// Highest-precedence recognised role, independent of claim order
    pub fn primary_role(&self) -> Option<AdminRole> {
        self.roles.iter().filter_map(|r| AdminRole::parse(r)).max()
    }

    /// Author name stamped on replies written by this user
    pub fn reply_display_name(&self) -> String {
        self.primary_role()
            .map(|role| role.display_label().to_string())
            .unwrap_or_else(|| FALLBACK_STAFF_DISPLAY_NAME.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "sub-1".to_string(),
            name: None,
            phone: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_primary_role_ignores_claim_order() {
        let user = user_with_roles(&["staff", "super_admin", "admin"]);
        assert_eq!(user.primary_role(), Some(AdminRole::SuperAdmin));

        let user = user_with_roles(&["admin", "staff"]);
        assert_eq!(user.primary_role(), Some(AdminRole::Admin));
    }

    #[test]
    fn test_reply_display_name_fallback_without_roles() {
        let user = user_with_roles(&[]);
        assert_eq!(user.reply_display_name(), "Admin");

        let user = user_with_roles(&["customer"]);
        assert_eq!(user.primary_role(), None);
        assert_eq!(user.reply_display_name(), "Admin");
    }

    #[test]
    fn test_reply_display_name_uses_highest_role() {
        let user = user_with_roles(&["staff", "admin"]);
        assert_eq!(user.reply_display_name(), "Admin");

        let user = user_with_roles(&["staff"]);
        assert_eq!(user.reply_display_name(), "Staff");
    }

    #[test]
    fn test_access_levels() {
        let staff = user_with_roles(&["staff"]);
        assert!(staff.has_staff_access());
        assert!(!staff.has_admin_access());

        let admin = user_with_roles(&["admin"]);
        assert!(admin.has_admin_access());
        assert!(admin.has_staff_access());
        assert!(!admin.is_super_admin());
    }
}
