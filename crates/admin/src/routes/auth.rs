//! Authentication route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use jfk_cannabis_core::Permission;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{AdminUser, CurrentAdmin, session_keys};
use crate::state::AppState;

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication state reported to the client.
#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub user: Option<AdminUser>,
    pub permissions: &'static [Permission],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthStatus {
    fn signed_in(admin: CurrentAdmin, include_token: bool) -> Self {
        Self {
            is_authenticated: true,
            permissions: admin.user.permissions(),
            token: include_token.then_some(admin.token),
            user: Some(admin.user),
        }
    }

    const fn signed_out() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            permissions: &[],
            token: None,
        }
    }
}

/// Check credentials and start an admin session.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthStatus>> {
    let directory = state.directory();
    let LoginRequest { email, password } = request;

    // argon2 verification is CPU-bound
    let auth = tokio::task::spawn_blocking(move || directory.login(&email, &password))
        .await
        .map_err(|e| AppError::Internal(format!("login task failed: {e}")))?
        .inspect_err(|_| tracing::info!("Admin login rejected"))?;

    let admin = CurrentAdmin {
        user: auth.user,
        token: auth.token,
        logged_in_at: Utc::now(),
    };
    set_current_admin(&session, &admin).await?;
    set_sentry_user(admin.user.id.as_i32(), Some(admin.user.email.as_str()));
    tracing::info!(admin_id = %admin.user.id, role = %admin.user.role, "Admin logged in");

    Ok(Json(AuthStatus::signed_in(admin, true)))
}

/// End the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<AuthStatus>> {
    clear_current_admin(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(Json(AuthStatus::signed_out()))
}

/// Who is logged in, if anyone.
#[instrument(skip(session))]
pub async fn me(session: Session) -> Result<Json<AuthStatus>> {
    let admin = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(Json(admin.map_or_else(AuthStatus::signed_out, |admin| {
        AuthStatus::signed_in(admin, false)
    })))
}
