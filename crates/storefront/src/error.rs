//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use jfk_cannabis_core::cart::CartError;
use jfk_cannabis_core::checkout::{self, ValidationIssue};

use crate::services::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Visitor is under the legal age.
    #[error("You must be 21 or older to enter")]
    Underage,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<IssueBody>,
}

#[derive(Debug, Serialize)]
struct IssueBody {
    code: ValidationIssue,
    message: &'static str,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Internal(_)
                | Self::Checkout(
                    CheckoutError::Session(_)
                        | CheckoutError::Timeout(_)
                        | CheckoutError::Gateway(_)
                        | CheckoutError::Rejected(checkout::CheckoutError::IllegalTransition { .. })
                )
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::OutOfStock(_) => StatusCode::CONFLICT,
                CartError::LineNotFound(_) => StatusCode::NOT_FOUND,
                CartError::InvalidOption { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Checkout(err) => match err {
                CheckoutError::Rejected(checkout::CheckoutError::Invalid(_)) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CheckoutError::AlreadyInFlight => StatusCode::CONFLICT,
                CheckoutError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::Rejected(checkout::CheckoutError::IllegalTransition { .. })
                | CheckoutError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Underage => StatusCode::FORBIDDEN,
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> String {
        match self {
            Self::Session(_)
            | Self::Internal(_)
            | Self::Checkout(
                CheckoutError::Session(_)
                | CheckoutError::Rejected(checkout::CheckoutError::IllegalTransition { .. }),
            ) => "Internal server error".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Checkout(CheckoutError::Rejected(checkout::CheckoutError::Invalid(_))) => {
                "Please fix the highlighted checkout fields".to_string()
            }
            Self::Checkout(CheckoutError::AlreadyInFlight) => {
                "Your order is already being placed".to_string()
            }
            Self::Checkout(CheckoutError::Timeout(_) | CheckoutError::Gateway(_)) => {
                "We could not place your order, please try again".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn issues(&self) -> Vec<IssueBody> {
        match self {
            Self::Checkout(CheckoutError::Rejected(checkout::CheckoutError::Invalid(issues))) => {
                issues
                    .iter()
                    .map(|&code| IssueBody {
                        code,
                        message: code.message(),
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.message(),
            issues: self.issues(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String(value.clone()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;
    use jfk_cannabis_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Cart(CartError::OutOfStock(ProductId::new(5)))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::LineNotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::AlreadyInFlight)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::Timeout(
                Duration::from_secs(1)
            ))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(get_status(AppError::Underage), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_error_lists_issues() {
        let err = AppError::Checkout(CheckoutError::Rejected(checkout::CheckoutError::Invalid(
            vec![ValidationIssue::EmptyCart, ValidationIssue::TermsNotAccepted],
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["issues"][0]["code"], "empty_cart");
        assert_eq!(json["issues"][1]["code"], "terms_not_accepted");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("db password is hunter2".to_string()).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("Internal server error"));
    }
}
