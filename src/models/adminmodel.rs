use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "admin_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Manager,
    Support,
}

impl AdminRole {
    pub fn to_str(&self) -> &str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Manager => "manager",
            AdminRole::Support => "support",
        }
    }
}

/// Capabilities a staff account can hold. `AdminRole::SuperAdmin`
/// satisfies every one of these by construction.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageBookings,
    ManageCustomers,
    ManageDrivers,
    ManageMessages,
    ManagePayments,
    ManageAdmins,
    ViewAnalytics,
}

impl Permission {
    pub fn to_str(&self) -> &str {
        match self {
            Permission::ManageBookings => "manage_bookings",
            Permission::ManageCustomers => "manage_customers",
            Permission::ManageDrivers => "manage_drivers",
            Permission::ManageMessages => "manage_messages",
            Permission::ManagePayments => "manage_payments",
            Permission::ManageAdmins => "manage_admins",
            Permission::ViewAnalytics => "view_analytics",
        }
    }

    pub fn from_str(value: &str) -> Option<Permission> {
        match value {
            "manage_bookings" => Some(Permission::ManageBookings),
            "manage_customers" => Some(Permission::ManageCustomers),
            "manage_drivers" => Some(Permission::ManageDrivers),
            "manage_messages" => Some(Permission::ManageMessages),
            "manage_payments" => Some(Permission::ManagePayments),
            "manage_admins" => Some(Permission::ManageAdmins),
            "view_analytics" => Some(Permission::ViewAnalytics),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Admin {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn has_permission(&self, permission: Permission) -> bool {
        if self.role == AdminRole::SuperAdmin {
            return true;
        }
        self.permissions
            .iter()
            .any(|p| Permission::from_str(p) == Some(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_with(role: AdminRole, permissions: Vec<&str>) -> Admin {
        Admin {
            id: uuid::Uuid::new_v4(),
            name: "Test Admin".to_string(),
            email: "staff@metrofleet.example".to_string(),
            password: "hash".to_string(),
            role,
            permissions: permissions.into_iter().map(String::from).collect(),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn super_admin_has_every_permission() {
        let admin = admin_with(AdminRole::SuperAdmin, vec![]);
        assert!(admin.has_permission(Permission::ManageBookings));
        assert!(admin.has_permission(Permission::ManageAdmins));
        assert!(admin.has_permission(Permission::ViewAnalytics));
    }

    #[test]
    fn permission_list_is_checked_for_other_roles() {
        let admin = admin_with(AdminRole::Support, vec!["manage_messages"]);
        assert!(admin.has_permission(Permission::ManageMessages));
        assert!(!admin.has_permission(Permission::ManageBookings));
    }

    #[test]
    fn unknown_permission_strings_are_ignored() {
        let admin = admin_with(AdminRole::Manager, vec!["not_a_permission"]);
        assert!(!admin.has_permission(Permission::ManageBookings));
    }
}
