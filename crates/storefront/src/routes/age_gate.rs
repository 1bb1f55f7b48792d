//! Age gate route handlers.

use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use jfk_cannabis_core::age;

use crate::error::{AppError, Result};
use crate::middleware::set_age_verified;
use crate::models::{AgeVerification, session_keys};

/// Age gate submission.
#[derive(Debug, Deserialize)]
pub struct AgeGateRequest {
    pub birth_date: NaiveDate,
}

/// Age gate state for the session.
#[derive(Debug, Serialize)]
pub struct AgeGateStatus {
    pub verified: bool,
}

/// Check a birth date and record the pass in the session.
#[instrument(skip(session, request))]
pub async fn verify(
    session: Session,
    Json(request): Json<AgeGateRequest>,
) -> Result<Json<AgeGateStatus>> {
    let now = Utc::now();
    if !age::is_of_legal_age(request.birth_date, now.date_naive()) {
        tracing::info!("Age gate declined");
        return Err(AppError::Underage);
    }

    set_age_verified(
        &session,
        &AgeVerification {
            birth_date: request.birth_date,
            verified_at: now,
        },
    )
    .await?;

    Ok(Json(AgeGateStatus { verified: true }))
}

/// Whether the session has passed the age gate.
#[instrument(skip(session))]
pub async fn status(session: Session) -> Result<Json<AgeGateStatus>> {
    let verified = session
        .get::<AgeVerification>(session_keys::AGE_VERIFIED)
        .await?
        .is_some();
    Ok(Json(AgeGateStatus { verified }))
}
