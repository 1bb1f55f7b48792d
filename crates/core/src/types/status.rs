//! Role and permission enums for back-office accounts.

use serde::{Deserialize, Serialize};

/// Back-office role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access including account management.
    Admin,
    /// Store management: products, inventory, POS sync, reports.
    Manager,
    /// Floor staff: read-only product and inventory views.
    Staff,
}

/// A single capability granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewProducts,
    ManageProducts,
    ViewInventory,
    ManageInventory,
    SyncPos,
    ViewReports,
    ManageUsers,
}

impl Role {
    /// Permissions granted to this role.
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Admin => &[
                Permission::ViewProducts,
                Permission::ManageProducts,
                Permission::ViewInventory,
                Permission::ManageInventory,
                Permission::SyncPos,
                Permission::ViewReports,
                Permission::ManageUsers,
            ],
            Self::Manager => &[
                Permission::ViewProducts,
                Permission::ManageProducts,
                Permission::ViewInventory,
                Permission::ManageInventory,
                Permission::SyncPos,
                Permission::ViewReports,
            ],
            Self::Staff => &[Permission::ViewProducts, Permission::ViewInventory],
        }
    }

    /// Whether this role grants `permission`.
    #[must_use]
    pub fn allows(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.allows(Permission::ManageUsers));
        assert!(!Role::Manager.allows(Permission::ManageUsers));
        assert!(Role::Manager.allows(Permission::SyncPos));
        assert!(Role::Staff.allows(Permission::ViewInventory));
        assert!(!Role::Staff.allows(Permission::ManageInventory));
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Manager, Role::Staff] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
