//! Handlers for the `/auth` resource (register, login, logout, profile).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use agrivision_core::error::AuthError;
use agrivision_core::types::format_display_timestamp;
use agrivision_db::models::session::CreateSession;
use agrivision_db::models::user::{CreateUser, UpdateUser, UserProfile};
use agrivision_db::repositories::{SessionRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::session::generate_session_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response. The token is returned exactly once; only its
/// hash is stored server-side.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

/// Request body for `PATCH /auth/update`. All fields optional; at least one
/// of username/email/password must be present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub new_username: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Response for `PATCH /auth/update`.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub new_username: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Duplicate username/email and password mismatch are
/// client errors; nothing is persisted on failure.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if input.password != input.confirm_password {
        return Err(AuthError::PasswordMismatch.into());
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LEN)
        .map_err(AppError::BadRequest)?;

    // Application-level duplicate checks; the uq_ constraints backstop the
    // race between check and insert.
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AuthError::DuplicateUsername.into());
    }
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AuthError::DuplicateEmail.into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registration successful".to_string(),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns an opaque session token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AuthError::BadPassword.into());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let (token, token_hash) = generate_session_token();
    let expires_at = Utc::now() + chrono::Duration::hours(state.config.session_ttl_hours);
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            token_hash,
            expires_at,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "login succeeded");
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        username: user.username,
        email: user.email,
        created_at: format_display_timestamp(user.created_at),
        last_login: user.last_login_at.map(format_display_timestamp),
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session behind the presented token. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke(&state.pool, auth.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/info
///
/// The authenticated user's profile, without the password hash.
pub async fn info(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserProfile>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    Ok(Json(UserProfile::from(&user)))
}

/// PATCH /api/v1/auth/update
///
/// Update username, email, and/or password as one atomic UPDATE.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UpdateProfileResponse>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut changes = UpdateUser::default();

    if let Some(username) = input.new_username {
        if UserRepo::username_taken_by_other(&state.pool, &username, auth.user_id).await? {
            return Err(AuthError::DuplicateUsername.into());
        }
        changes.username = Some(username);
    }

    if let Some(email) = input.email {
        if UserRepo::email_taken_by_other(&state.pool, &email, auth.user_id).await? {
            return Err(AuthError::DuplicateEmail.into());
        }
        changes.email = Some(email);
    }

    if let Some(password) = input.password {
        if input.confirm_password.as_deref() != Some(password.as_str()) {
            return Err(AuthError::PasswordMismatch.into());
        }
        validate_password_strength(&password, MIN_PASSWORD_LEN).map_err(AppError::BadRequest)?;
        let hash = hash_password(&password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
        changes.password_hash = Some(hash);
    }

    if changes.is_empty() {
        return Err(AuthError::NothingToUpdate.into());
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &changes)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    tracing::info!(user_id = user.id, username = %user.username, "profile updated");
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated".to_string(),
        new_username: user.username,
    }))
}
