//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use jfk_cannabis_core::inventory::InventoryError;

use crate::alleaves::PosError;
use crate::services::{AuthError, StoreError};

/// Application-level error type for the back office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Inventory operation failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] StoreError),

    /// POS call failed.
    #[error("POS error: {0}")]
    Pos(#[from] PosError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Inventory(StoreError::Inventory(err)) => match err {
                InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
                InventoryError::NotManual(_) => StatusCode::CONFLICT,
                InventoryError::EmptyLocation => StatusCode::BAD_REQUEST,
            },
            Self::Pos(err) => match err {
                PosError::NotFound(_) => StatusCode::NOT_FOUND,
                PosError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                PosError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
                PosError::Http(_) | PosError::Api { .. } => StatusCode::BAD_GATEWAY,
                PosError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(_)
            | Self::Inventory(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    // Don't expose internal error details to clients
    fn message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                "Point of sale unavailable".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;
    use jfk_cannabis_core::inventory::InventoryItemId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("sync_pos".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Inventory(StoreError::Inventory(
                InventoryError::NotManual(InventoryItemId::new("alleaves-inv-1"))
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Inventory(StoreError::Inventory(
                InventoryError::EmptyLocation
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Pos(PosError::Timeout(Duration::from_secs(10)))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            get_status(AppError::Pos(PosError::NotFound("product alv-9".to_string()))),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_login_failure_body() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("ledger lock poisoned".to_string()).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
