/// Task activity log model
///
/// An append-only history of tracked changes to tasks. Rows are created
/// exclusively as a side effect of a task update (inside the same
/// transaction) and are never mutated; they only disappear when their task
/// is removed by a cascade.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_action_type AS ENUM ('status_changed', 'reassigned', 'edited');
///
/// CREATE TABLE task_activity (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id),
///     action_type task_action_type NOT NULL,
///     old_value TEXT NOT NULL,
///     new_value TEXT NOT NULL,
///     changed_by UUID NOT NULL REFERENCES users(id),
///     timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Kind of tracked change an activity row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_action_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskActionType {
    /// Status moved between lifecycle states
    StatusChanged,

    /// Task handed to a different assignee
    Reassigned,

    /// Title or description text changed
    Edited,
}

impl TaskActionType {
    /// Gets action type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskActionType::StatusChanged => "status_changed",
            TaskActionType::Reassigned => "reassigned",
            TaskActionType::Edited => "edited",
        }
    }
}

/// A recorded change on a task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskActivity {
    /// Unique activity ID
    pub id: Uuid,

    /// Task the change belongs to
    pub task_id: Uuid,

    /// What kind of change happened
    pub action_type: TaskActionType,

    /// Value before the change (status name, user id, or free text)
    pub old_value: String,

    /// Value after the change
    pub new_value: String,

    /// User who made the change
    pub changed_by: Uuid,

    /// When the change was recorded
    pub timestamp: DateTime<Utc>,
}

/// An activity row derived from a task update, not yet persisted
///
/// Produced by the update diff and inserted in the same transaction as the
/// task mutation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskActivity {
    /// What kind of change happened
    pub action_type: TaskActionType,

    /// Value before the change
    pub old_value: String,

    /// Value after the change
    pub new_value: String,

    /// User who made the change
    pub changed_by: Uuid,
}

impl TaskActivity {
    /// Lists all activity for a task, newest first
    ///
    /// Callers are expected to have verified the task exists; an unknown
    /// task id simply yields an empty list here.
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskActivity>(
            r#"
            SELECT id, task_id, action_type, old_value, new_value, changed_by, timestamp
            FROM task_activity
            WHERE task_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts all activity rows for a task
    pub async fn count_for_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM task_activity WHERE task_id = $1")
                .bind(task_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_as_str() {
        assert_eq!(TaskActionType::StatusChanged.as_str(), "status_changed");
        assert_eq!(TaskActionType::Reassigned.as_str(), "reassigned");
        assert_eq!(TaskActionType::Edited.as_str(), "edited");
    }

    #[test]
    fn test_action_type_serde() {
        assert_eq!(
            serde_json::to_string(&TaskActionType::StatusChanged).unwrap(),
            "\"status_changed\""
        );
        assert_eq!(
            serde_json::from_str::<TaskActionType>("\"reassigned\"").unwrap(),
            TaskActionType::Reassigned
        );
    }
}
