//! User account routes.
//!
//! JSON API for signing up, exchanging credentials for a token, and managing
//! the authenticated caller's own profile.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireToken;
use crate::models::User;
use crate::services::auth::{AuthError, validate_password};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Signup request body.
///
/// Fields are optional at the JSON level so a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Credentials for `POST /users/token`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Profile changes for `PATCH /users/me`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMeRequest {
    /// New display name; an empty string clears it.
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user. Never carries the password.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email.into_inner(),
            name: user.name,
        }
    }
}

/// Token issued by `POST /users/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new user.
///
/// POST /users/create
///
/// # Errors
///
/// Returns `400` if the email is missing, malformed, or taken, or the password
/// is shorter than the configured minimum.
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;

    let password = request
        .password
        .ok_or(AuthError::MissingField("password"))?;
    validate_password(&password, state.config().min_password_length)?;

    let user = state
        .directory()
        .create_user(request.email.as_deref(), &password, request.name.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange email and password for an API token.
///
/// POST /users/token
///
/// # Errors
///
/// Returns `400` for any credential failure, without saying which part failed.
pub async fn create_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload?;

    let token = state
        .tokens()
        .issue_token(&request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse {
        token: token.value().expose_secret().to_owned(),
    }))
}

/// Get the authenticated user's profile.
///
/// GET /users/me
pub async fn me(RequireToken(user): RequireToken) -> Json<UserResponse> {
    Json(user.into())
}

/// Update the authenticated user's name and/or password.
///
/// PATCH /users/me
///
/// # Errors
///
/// Returns `400` if the new password is too short, `401` without a valid token.
pub async fn update_me(
    State(state): State<AppState>,
    RequireToken(user): RequireToken,
    payload: std::result::Result<Json<UpdateMeRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(request) = payload?;
    let directory = state.directory();

    if let Some(password) = &request.password {
        validate_password(password, state.config().min_password_length)?;
        directory.change_password(user.id, password).await?;
    }

    let user = match request.name {
        Some(name) => {
            let name = (!name.is_empty()).then_some(name.as_str());
            directory.update_name(user.id, name).await?
        }
        None => directory.get_user(user.id).await?,
    };

    Ok(Json(user.into()))
}
