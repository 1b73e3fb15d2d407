/// User management endpoints
///
/// # Endpoints
///
/// - `POST /users` - Create a user (admin-only)
/// - `GET /users` - List all users
/// - `DELETE /users/:id` - Delete a user and everything they own (admin-only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskboard_shared::{
    auth::{password, policy, principal::CurrentUser},
    models::user::{CreateUser, PublicUser, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Email address (must be unique)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Role to assign
    pub role: UserRole,
}

/// Create user handler (admin-only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already in use
/// - `403 Forbidden`: Caller is not an admin
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    policy::require_admin(&current_user)?;
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    // A duplicate email surfaces from the unique constraint as a 400
    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    Ok(Json(user.into()))
}

/// List users handler
///
/// Returns every user in their public projection (no password hashes).
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list_public(&state.db).await?;

    Ok(Json(users))
}

/// Delete user handler (admin-only)
///
/// Cascades to activity rows, assigned tasks, and owned projects with their
/// tasks, all in one transaction. Admins cannot delete their own account.
///
/// # Errors
///
/// - `400 Bad Request`: Attempted self-deletion
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: User does not exist
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    policy::require_admin(&current_user)?;

    if user_id == current_user.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete_cascade(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User was not found".to_string()));
    }

    Ok(Json(json!({ "id": user_id })))
}
