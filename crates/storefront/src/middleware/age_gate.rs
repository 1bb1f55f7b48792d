//! Age gate extractor.
//!
//! Cart and checkout handlers take [`RequireAgeVerified`]; visitors who have
//! not passed the age gate get a 403 with a pointer to the gate.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{AgeVerification, session_keys};

/// Extractor that requires a passed age gate.
pub struct RequireAgeVerified(pub AgeVerification);

/// Returned when the age gate has not been passed.
pub enum AgeGateRejection {
    /// Session layer missing from the router.
    MissingSession,
    /// Visitor has not confirmed their age.
    NotVerified,
}

impl IntoResponse for AgeGateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Self::NotVerified => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Please confirm you are 21 or older",
                    "age_gate": "/api/age-gate",
                })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAgeVerified
where
    S: Send + Sync,
{
    type Rejection = AgeGateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AgeGateRejection::MissingSession)?;

        let verification: AgeVerification = session
            .get(session_keys::AGE_VERIFIED)
            .await
            .ok()
            .flatten()
            .ok_or(AgeGateRejection::NotVerified)?;

        Ok(Self(verification))
    }
}

/// Record a passed age gate in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_age_verified(
    session: &Session,
    verification: &AgeVerification,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::AGE_VERIFIED, verification)
        .await
}
