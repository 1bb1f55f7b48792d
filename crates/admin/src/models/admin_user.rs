//! Back-office user domain types.

use serde::{Deserialize, Serialize};

use jfk_cannabis_core::{AdminUserId, Email, Permission, Role};

/// A back-office user (never carries a password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
}

impl AdminUser {
    /// Permissions granted by the user's role.
    #[must_use]
    pub const fn permissions(&self) -> &'static [Permission] {
        self.role.permissions()
    }

    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.role.allows(permission)
    }
}
