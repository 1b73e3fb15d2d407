/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Exchange credentials for an access token
/// - `GET /auth/me` - Identity of the calling user (bearer token required)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password, principal::CurrentUser},
    models::user::{PublicUser, User},
};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed access token
    pub access_token: String,
}

/// Login endpoint
///
/// Authenticates a user and returns a signed access token carrying their
/// id, email, and role.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password - the two cases
///   are deliberately indistinguishable
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::with_expiration(
        user.id,
        user.email,
        user.role,
        Duration::hours(state.config.jwt.expiration_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse { access_token }))
}

/// Current-user endpoint
///
/// Resolves the authenticated principal back to its user record. Returns
/// 401 rather than 404 when the account no longer exists, so a deleted
/// user's still-valid token cannot probe for its own absence.
pub async fn me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, current_user.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(user.into()))
}
