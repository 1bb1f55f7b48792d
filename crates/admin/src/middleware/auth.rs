//! Authentication extractors and permission checks for admin.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use jfk_cannabis_core::Permission;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.user.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but the user is not logged in.
pub enum AdminAuthRejection {
    /// Session layer missing from the router.
    MissingSession,
    /// No admin in the session.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Login required" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::MissingSession)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        Ok(Self(admin))
    }
}

impl RequireAdminAuth {
    /// The admin, if their role grants `permission`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` otherwise.
    pub fn require(self, permission: Permission) -> Result<CurrentAdmin, AppError> {
        require_permission(&self.0, permission)?;
        Ok(self.0)
    }
}

/// Check that `admin`'s role grants `permission`.
///
/// # Errors
///
/// Returns `AppError::Forbidden` naming the missing permission.
pub fn require_permission(admin: &CurrentAdmin, permission: Permission) -> Result<(), AppError> {
    if admin.user.can(permission) {
        Ok(())
    } else {
        tracing::warn!(
            admin_id = %admin.user.id,
            role = %admin.user.role,
            ?permission,
            "Permission denied"
        );
        Err(AppError::Forbidden(format!("missing permission {permission:?}")))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use jfk_cannabis_core::{AdminUserId, Email, Role};

    use super::*;
    use crate::models::AdminUser;

    fn admin(role: Role) -> CurrentAdmin {
        CurrentAdmin {
            user: AdminUser {
                id: AdminUserId::new(9),
                email: Email::parse("floor@jfkcannabis.com").unwrap(),
                name: "Floor".to_string(),
                role,
            },
            token: "token".to_string(),
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_permission() {
        assert!(require_permission(&admin(Role::Staff), Permission::ViewInventory).is_ok());
        assert!(matches!(
            require_permission(&admin(Role::Staff), Permission::ManageInventory),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_permission(&admin(Role::Manager), Permission::SyncPos).is_ok());
        assert!(require_permission(&admin(Role::Manager), Permission::ManageUsers).is_err());
    }
}
