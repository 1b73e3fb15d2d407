/// Task lifecycle endpoints
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task (policy: admin, or member in own project)
/// - `GET /tasks` - List tasks with optional filters
/// - `PATCH /tasks/:id` - Partially update a task; tracked changes land in
///   the activity log atomically with the mutation
/// - `GET /tasks/:id/activity` - Activity log, newest first
/// - `DELETE /tasks/:id` - Delete a task (admin-only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use taskboard_shared::{
    auth::{
        policy::{self, TaskAction},
        principal::CurrentUser,
    },
    dates::parse_date_only,
    models::{
        activity::TaskActivity,
        project::Project,
        task::{
            build_activity_log, validate_update, CreateTask, Task, TaskFilter, TaskPriority,
            TaskStatus, TaskUpdate,
        },
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 50;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Short title
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    /// Longer free-text description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Initial lifecycle status (caller-supplied, no implicit default)
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,

    /// Optional due date in YYYY-MM-DD form
    pub due_date: Option<String>,
}

/// Partial update request
///
/// Only supplied fields are touched. For `due_date`, an explicit JSON null
/// clears the date; omitting the field leaves it untouched - the custom
/// deserializer keeps the two cases apart.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
}

/// Task list query parameters
///
/// All filters are optional and AND-composed; `search` matches title OR
/// description case-insensitively.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub due_from: Option<String>,
    pub due_to: Option<String>,
    pub search: Option<String>,

    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

/// Deserializes a field so that "absent" and "present but null" stay
/// distinguishable: absent yields `None` (via the serde default), null
/// yields `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Create task handler
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or `due_date` is malformed or not
///   a real calendar date
/// - `403 Forbidden`: Member creating a task in a project they do not own
/// - `404 Not Found`: Project or assignee does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let project = Project::find_by_id(&state.db, req.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project was not found".to_string()))?;

    User::find_by_id(&state.db, req.assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound("User was not found".to_string()))?;

    policy::check_project_access(&current_user, project.created_by, TaskAction::Create)?;

    let due_date = match req.due_date {
        Some(ref raw) => Some(parse_date_only(raw, "due_date")?),
        None => None,
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date,
            project_id: req.project_id,
            assigned_to: req.assigned_to,
        },
    )
    .await?;

    Ok(Json(task))
}

/// List tasks handler
///
/// # Errors
///
/// - `400 Bad Request`: A date filter is malformed or impossible, or
///   `due_from` is later than `due_to`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    query.validate()?;

    let due_from = match query.due_from {
        Some(ref raw) => Some(parse_date_only(raw, "due_from")?),
        None => None,
    };
    let due_to = match query.due_to {
        Some(ref raw) => Some(parse_date_only(raw, "due_to")?),
        None => None,
    };

    if let (Some(from), Some(to)) = (due_from, due_to) {
        if from > to {
            return Err(ApiError::BadRequest(
                "due_from cannot be later than due_to".to_string(),
            ));
        }
    }

    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        assigned_to: query.assigned_to,
        project_id: query.project_id,
        due_from,
        due_to,
        search: query.search,
        page: query.page.unwrap_or(DEFAULT_PAGE),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
    };

    let tasks = Task::list(&state.db, &filter).await?;

    Ok(Json(tasks))
}

/// Update task handler
///
/// Applies a PATCH-style partial update. Changes to the tracked facets
/// (status, assignee, title, description) are diffed against the pre-update
/// snapshot and recorded in the activity log inside the same transaction as
/// the mutation, so either both persist or neither does.
///
/// # Errors
///
/// - `400 Bad Request`: Leaving the terminal `done` status, moving the task
///   to another project, or a malformed/impossible `due_date`
/// - `403 Forbidden`: Member updating a task in a project they do not own
/// - `404 Not Found`: Task or new assignee does not exist
pub async fn update_task(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let found = Task::find_with_project_owner(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task was not found".to_string()))?;
    let task = found.task;

    policy::check_project_access(&current_user, found.project_owner, TaskAction::Update)?;

    let mut update = TaskUpdate {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        assigned_to: req.assigned_to,
        due_date: None,
        project_id: req.project_id,
    };

    validate_update(&task, &update)?;

    if let Some(assigned_to) = update.assigned_to {
        User::find_by_id(&state.db, assigned_to)
            .await?
            .ok_or_else(|| ApiError::NotFound("User was not found".to_string()))?;
    }

    if let Some(raw) = req.due_date {
        update.due_date = Some(match raw {
            Some(ref value) => Some(parse_date_only(value, "due_date")?),
            None => None,
        });
    }

    let activities = build_activity_log(&task, &update, current_user.id);
    let updated = Task::apply_update(&state.db, task_id, &update, &activities).await?;

    Ok(Json(updated))
}

/// Task activity handler
///
/// Returns the task's activity log, newest first.
///
/// # Errors
///
/// - `404 Not Found`: Task does not exist
pub async fn get_task_activity(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskActivity>>> {
    if !Task::exists(&state.db, task_id).await? {
        return Err(ApiError::NotFound("Task was not found".to_string()));
    }

    let activity = TaskActivity::list_for_task(&state.db, task_id).await?;

    Ok(Json(activity))
}

/// Delete task handler (admin-only)
///
/// Removes the task and its activity log in one transaction.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Task does not exist
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    policy::require_admin(&current_user)?;

    let deleted = Task::delete_cascade(&state.db, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task was not found".to_string()));
    }

    Ok(Json(json!({ "id": task_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_absent_and_null_due_date() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.due_date, None);

        let null: UpdateTaskRequest = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(null.due_date, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"due_date": "2024-06-01"}"#).unwrap();
        assert_eq!(set.due_date, Some(Some("2024-06-01".to_string())));
    }

    #[test]
    fn test_list_query_limits() {
        let query = ListTasksQuery {
            limit: Some(100),
            page: Some(1),
            ..Default::default()
        };
        assert!(query.validate().is_ok());

        let query = ListTasksQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = ListTasksQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_status_parses_from_query_names() {
        let query: ListTasksQuery =
            serde_json::from_str(r#"{"status": "in_progress", "priority": "high"}"#).unwrap();
        assert_eq!(query.status, Some(TaskStatus::InProgress));
        assert_eq!(query.priority, Some(TaskPriority::High));
    }
}
