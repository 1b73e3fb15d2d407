/// Project endpoints
///
/// # Endpoints
///
/// - `POST /projects` - Create a project (caller becomes the owner)
/// - `GET /projects` - List all projects
/// - `DELETE /projects/:id` - Delete a project and its tasks (admin-only)

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
    auth::{policy, principal::CurrentUser},
    models::project::{CreateProject, Project},
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Project description
    pub description: String,
}

/// Create project handler
///
/// Any authenticated user may create a project; they become its permanent
/// owner.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            created_by: current_user.id,
        },
    )
    .await?;

    Ok(Json(project))
}

/// List projects handler
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list(&state.db).await?;

    Ok(Json(projects))
}

/// Delete project handler (admin-only)
///
/// Cascades to the project's tasks and their activity log in one
/// transaction.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Project does not exist
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    policy::require_admin(&current_user)?;

    let deleted = Project::delete_cascade(&state.db, project_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project was not found".to_string()));
    }

    Ok(Json(json!({ "id": project_id })))
}
