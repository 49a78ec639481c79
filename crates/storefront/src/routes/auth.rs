//! Auth route handlers.
//!
//! Credential verification is the backend's job; these handlers only bind
//! the verified identity to the session. Nobody gets at a cart or a
//! dashboard without that binding.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sokoni_backend::Backend;
use sokoni_core::Email;

use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Email/password credentials.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Create an account and start a session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    let email = parse_email(&form.email)?;
    if form.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let identity = state.backend().register(&email, &form.password).await?;
    let user = CurrentUser::from(identity);
    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Verify credentials and start a session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CredentialsRequest>,
) -> Result<Json<CurrentUser>> {
    let email = parse_email(&form.email)?;
    let identity = state
        .backend()
        .verify_credentials(&email, &form.password)
        .await?;

    let user = CurrentUser::from(identity);
    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(user))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// The current identity, or `null` when nobody is signed in.
#[instrument(skip(user))]
pub async fn me(OptionalAuth(user): OptionalAuth) -> Json<Option<CurrentUser>> {
    Json(user)
}
