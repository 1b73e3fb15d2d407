/// Task model, lifecycle rules, and database operations
///
/// Tasks are the core entity of the system. This module owns the task
/// lifecycle: creation, filtered listing, and partial updates that derive
/// activity-log entries and apply them atomically with the mutation.
///
/// # State Machine
///
/// ```text
/// todo ⇄ in_progress ⇄ review → done
/// ```
///
/// Any status may move to any other, with one exception: `done` is an
/// absorbing terminal state. A task that reached `done` can never leave it;
/// attempting to is a rejected operation, not a silent no-op.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL,
///     priority task_priority NOT NULL,
///     due_date DATE,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     assigned_to UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `project_id` is immutable after creation. `due_date` is a calendar date
/// with no time component.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::activity::{NewTaskActivity, TaskActionType};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    Review,

    /// Finished (terminal, absorbing)
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Checks if status is terminal (no transition can leave it)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Checks if transition to target status is valid
    ///
    /// Every transition is allowed except leaving `done`. Re-stating the
    /// current status counts as valid (it is not a transition).
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        !(self.is_terminal() && target != *self)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its wire/database name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Longer free-text description
    pub description: String,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional calendar due date (no time component)
    pub due_date: Option<NaiveDate>,

    /// Project the task belongs to (immutable after creation)
    pub project_id: Uuid,

    /// Currently assigned user
    pub assigned_to: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task joined with its project's owner
///
/// Used by the update path, which needs the owner id for the policy check
/// without a second round-trip.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskWithProjectOwner {
    /// The task itself
    #[sqlx(flatten)]
    pub task: Task,

    /// `created_by` of the task's project
    pub project_owner: Uuid,
}

/// Input for creating a new task
///
/// The initial status is caller-supplied; there is no implicit default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub project_id: Uuid,
    pub assigned_to: Uuid,
}

/// A validated partial update to a task
///
/// Only supplied fields are touched. `due_date` distinguishes "not
/// supplied" (outer None) from "supplied as null to clear the date"
/// (Some(None)). `project_id` is carried for the immutability check only
/// and is never written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<Option<NaiveDate>>,
    pub project_id: Option<Uuid>,
}

/// Filters for listing tasks
///
/// All supplied filters are AND-composed; the search term matches title OR
/// description, case-insensitively. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            assigned_to: None,
            project_id: None,
            due_from: None,
            due_to: None,
            search: None,
            page: 1,
            limit: 50,
        }
    }
}

/// Error type for rejected task updates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskUpdateError {
    /// Status left the terminal `done` state
    #[error("Task in done status cannot be reopened")]
    TerminalState,

    /// Update tried to move the task to another project
    #[error("Moving task to another project is not allowed")]
    ProjectImmutable,
}

/// Validates a partial update against the task's current state
///
/// Enforces the two lifecycle invariants:
/// - a task whose status is `done` cannot transition to any other status
/// - `project_id` is immutable after creation
///
/// Re-sending the current status or the current project id is valid.
pub fn validate_update(task: &Task, update: &TaskUpdate) -> Result<(), TaskUpdateError> {
    if let Some(new_status) = update.status {
        if !task.status.can_transition_to(new_status) {
            return Err(TaskUpdateError::TerminalState);
        }
    }

    if let Some(project_id) = update.project_id {
        if project_id != task.project_id {
            return Err(TaskUpdateError::ProjectImmutable);
        }
    }

    Ok(())
}

/// Derives activity-log entries from a partial update
///
/// Compares each trackable facet of the update against the pre-update
/// snapshot and emits one entry per facet that actually changes:
///
/// - status → `status_changed` (old/new status names)
/// - assignee → `reassigned` (old/new user ids, stringified)
/// - title → `edited` (old/new text)
/// - description → `edited` (old/new text)
///
/// Fields re-sent with their current value produce nothing. Priority and
/// due-date changes are applied but not tracked.
pub fn build_activity_log(
    task: &Task,
    update: &TaskUpdate,
    changed_by: Uuid,
) -> Vec<NewTaskActivity> {
    let mut events = Vec::new();

    if let Some(new_status) = update.status {
        if new_status != task.status {
            events.push(NewTaskActivity {
                action_type: TaskActionType::StatusChanged,
                old_value: task.status.as_str().to_string(),
                new_value: new_status.as_str().to_string(),
                changed_by,
            });
        }
    }

    if let Some(assigned_to) = update.assigned_to {
        if assigned_to != task.assigned_to {
            events.push(NewTaskActivity {
                action_type: TaskActionType::Reassigned,
                old_value: task.assigned_to.to_string(),
                new_value: assigned_to.to_string(),
                changed_by,
            });
        }
    }

    if let Some(ref title) = update.title {
        if *title != task.title {
            events.push(NewTaskActivity {
                action_type: TaskActionType::Edited,
                old_value: task.title.clone(),
                new_value: title.clone(),
                changed_by,
            });
        }
    }

    if let Some(ref description) = update.description {
        if *description != task.description {
            events.push(NewTaskActivity {
                action_type: TaskActionType::Edited,
                old_value: task.description.clone(),
                new_value: description.clone(),
                changed_by,
            });
        }
    }

    events
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, \
                            project_id, assigned_to, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// No activity rows are written: the activity log records changes to
    /// existing tasks only.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, project_id, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.due_date)
            .bind(data.project_id)
            .bind(data.assigned_to)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task together with its project's owner id
    pub async fn find_with_project_owner(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithProjectOwner>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskWithProjectOwner>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date,
                   t.project_id, t.assigned_to, t.created_at, t.updated_at,
                   p.created_by AS project_owner
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Checks whether a task exists
    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    /// Lists tasks matching the filter
    ///
    /// Ordering is total and deterministic: newest first by creation time,
    /// then by id. The WHERE clause is built dynamically with numbered
    /// binds, one per supplied filter; the search term is matched with
    /// ILIKE against title and description.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_count = 0;

        if filter.status.is_some() {
            bind_count += 1;
            conditions.push(format!("status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            conditions.push(format!("priority = ${}", bind_count));
        }
        if filter.assigned_to.is_some() {
            bind_count += 1;
            conditions.push(format!("assigned_to = ${}", bind_count));
        }
        if filter.project_id.is_some() {
            bind_count += 1;
            conditions.push(format!("project_id = ${}", bind_count));
        }
        if filter.due_from.is_some() {
            bind_count += 1;
            conditions.push(format!("due_date >= ${}", bind_count));
        }
        if filter.due_to.is_some() {
            bind_count += 1;
            conditions.push(format!("due_date <= ${}", bind_count));
        }

        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if search.is_some() {
            conditions.push(format!(
                "(title ILIKE ${} OR description ILIKE ${})",
                bind_count + 1,
                bind_count + 2
            ));
            bind_count += 2;
        }

        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut query = sqlx::query_as::<_, Task>(&sql);

        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(priority) = filter.priority {
            query = query.bind(priority);
        }
        if let Some(assigned_to) = filter.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(project_id) = filter.project_id {
            query = query.bind(project_id);
        }
        if let Some(due_from) = filter.due_from {
            query = query.bind(due_from);
        }
        if let Some(due_to) = filter.due_to {
            query = query.bind(due_to);
        }
        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let offset = (filter.page.max(1) - 1) * filter.limit;
        query = query.bind(filter.limit).bind(offset);

        query.fetch_all(pool).await
    }

    /// Applies a validated partial update and its derived activity entries
    /// as one atomic unit
    ///
    /// Either the task mutation and all activity rows persist, or neither
    /// does. `updated_at` is always refreshed.
    ///
    /// Callers must run [`validate_update`] first and derive `activities`
    /// via [`build_activity_log`] from the same snapshot.
    pub async fn apply_update(
        pool: &PgPool,
        id: Uuid,
        update: &TaskUpdate,
        activities: &[NewTaskActivity],
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // $1 is the task id; the SET clause binds start at $2
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut bind_count = 1;

        if update.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if update.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if update.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }
        if update.priority.is_some() {
            bind_count += 1;
            sets.push(format!("priority = ${}", bind_count));
        }
        if update.assigned_to.is_some() {
            bind_count += 1;
            sets.push(format!("assigned_to = ${}", bind_count));
        }
        if update.due_date.is_some() {
            bind_count += 1;
            sets.push(format!("due_date = ${}", bind_count));
        }

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = $1 RETURNING {TASK_COLUMNS}",
            sets.join(", "),
        );

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(id);

        if let Some(ref title) = update.title {
            query = query.bind(title);
        }
        if let Some(ref description) = update.description {
            query = query.bind(description);
        }
        if let Some(status) = update.status {
            query = query.bind(status);
        }
        if let Some(priority) = update.priority {
            query = query.bind(priority);
        }
        if let Some(assigned_to) = update.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(due_date) = update.due_date {
            query = query.bind(due_date);
        }

        let task = query.fetch_one(&mut *tx).await?;

        for activity in activities {
            sqlx::query(
                r#"
                INSERT INTO task_activity (task_id, action_type, old_value, new_value, changed_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(activity.action_type)
            .bind(&activity.old_value)
            .bind(&activity.new_value)
            .bind(activity.changed_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(task)
    }

    /// Deletes a task and its activity log in one transaction
    ///
    /// # Returns
    ///
    /// True if the task existed and was deleted, false otherwise
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM task_activity WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write release notes".to_string(),
            description: "Summarize the 1.4 changes".to_string(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            project_id: Uuid::new_v4(),
            assigned_to: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_transitions() {
        use TaskStatus::*;

        // Everything is reachable from non-terminal states
        for from in [Todo, InProgress, Review] {
            for to in [Todo, InProgress, Review, Done] {
                assert!(from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }

        // Done is absorbing
        assert!(Done.can_transition_to(Done));
        for to in [Todo, InProgress, Review] {
            assert!(!Done.can_transition_to(to), "done -> {:?} must be invalid", to);
        }
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Todo.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::Review.is_terminal());
    }

    #[test]
    fn test_status_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"todo\"").unwrap(),
            TaskStatus::Todo
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::High).unwrap(),
            "\"high\""
        );
    }

    #[test]
    fn test_validate_update_rejects_leaving_done() {
        let mut task = sample_task();
        task.status = TaskStatus::Done;

        let update = TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };

        assert_eq!(
            validate_update(&task, &update),
            Err(TaskUpdateError::TerminalState)
        );
    }

    #[test]
    fn test_validate_update_allows_restating_done() {
        let mut task = sample_task();
        task.status = TaskStatus::Done;

        let update = TaskUpdate {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };

        assert!(validate_update(&task, &update).is_ok());
    }

    #[test]
    fn test_validate_update_rejects_project_move() {
        let task = sample_task();

        let update = TaskUpdate {
            project_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        assert_eq!(
            validate_update(&task, &update),
            Err(TaskUpdateError::ProjectImmutable)
        );
    }

    #[test]
    fn test_validate_update_allows_restating_project() {
        let task = sample_task();

        let update = TaskUpdate {
            project_id: Some(task.project_id),
            status: Some(TaskStatus::Review),
            ..Default::default()
        };

        assert!(validate_update(&task, &update).is_ok());
    }

    #[test]
    fn test_activity_log_empty_for_unchanged_fields() {
        let task = sample_task();
        let actor = Uuid::new_v4();

        // Every trackable facet re-sent with its current value
        let update = TaskUpdate {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            status: Some(task.status),
            assigned_to: Some(task.assigned_to),
            ..Default::default()
        };

        assert!(build_activity_log(&task, &update, actor).is_empty());
    }

    #[test]
    fn test_activity_log_tracks_status_change() {
        let task = sample_task();
        let actor = Uuid::new_v4();

        let update = TaskUpdate {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };

        let events = build_activity_log(&task, &update, actor);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, TaskActionType::StatusChanged);
        assert_eq!(events[0].old_value, "todo");
        assert_eq!(events[0].new_value, "done");
        assert_eq!(events[0].changed_by, actor);
    }

    #[test]
    fn test_activity_log_tracks_reassignment_with_stringified_ids() {
        let task = sample_task();
        let actor = Uuid::new_v4();
        let new_assignee = Uuid::new_v4();

        let update = TaskUpdate {
            assigned_to: Some(new_assignee),
            ..Default::default()
        };

        let events = build_activity_log(&task, &update, actor);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, TaskActionType::Reassigned);
        assert_eq!(events[0].old_value, task.assigned_to.to_string());
        assert_eq!(events[0].new_value, new_assignee.to_string());
    }

    #[test]
    fn test_activity_log_one_entry_per_changed_facet() {
        let task = sample_task();
        let actor = Uuid::new_v4();

        let update = TaskUpdate {
            title: Some("New title".to_string()),
            description: Some("New description".to_string()),
            status: Some(TaskStatus::Review),
            assigned_to: Some(Uuid::new_v4()),
            // Priority changes are applied but not tracked
            priority: Some(TaskPriority::High),
            ..Default::default()
        };

        let events = build_activity_log(&task, &update, actor);
        assert_eq!(events.len(), 4);

        let edited = events
            .iter()
            .filter(|e| e.action_type == TaskActionType::Edited)
            .count();
        assert_eq!(edited, 2);
    }

    #[test]
    fn test_activity_log_ignores_untracked_fields() {
        let task = sample_task();

        let update = TaskUpdate {
            priority: Some(TaskPriority::High),
            due_date: Some(Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())),
            ..Default::default()
        };

        assert!(build_activity_log(&task, &update, Uuid::new_v4()).is_empty());
    }

    // Database operations are covered in tests/store_tests.rs
}
