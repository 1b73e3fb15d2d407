/// Dashboard aggregates
///
/// Read-only summary counts over the whole task table: tasks by status, by
/// project, and by assignee. There is no caching; every call reflects the
/// store at that moment. The three grouped counts are independent and run
/// concurrently; the name lookups that label the project/user groups run
/// afterwards, and groups whose project or user vanished in between fall
/// back to a placeholder label.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::task::TaskStatus;

/// Task count for one status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

/// Task count for one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCount {
    pub project_id: Uuid,
    pub project_name: String,
    pub count: i64,
}

/// Task count for one assignee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCount {
    pub user_id: Uuid,
    pub user_name: String,
    pub count: i64,
}

/// The complete dashboard summary
///
/// Each grouping partitions the same task table, so the three count sums
/// are always equal to each other and to the total task count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(rename = "byStatus")]
    pub by_status: Vec<StatusCount>,

    #[serde(rename = "byProject")]
    pub by_project: Vec<ProjectCount>,

    #[serde(rename = "byUser")]
    pub by_user: Vec<UserCount>,
}

impl DashboardSummary {
    /// Computes the summary from the current store state
    ///
    /// The three GROUP BY queries run concurrently; the project and user
    /// name lookups follow once the grouped counts are in.
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let (status_groups, project_groups, user_groups) = tokio::try_join!(
            sqlx::query_as::<_, (TaskStatus, i64)>(
                "SELECT status, COUNT(*) FROM tasks GROUP BY status ORDER BY status",
            )
            .fetch_all(pool),
            sqlx::query_as::<_, (Uuid, i64)>(
                "SELECT project_id, COUNT(*) FROM tasks GROUP BY project_id",
            )
            .fetch_all(pool),
            sqlx::query_as::<_, (Uuid, i64)>(
                "SELECT assigned_to, COUNT(*) FROM tasks GROUP BY assigned_to",
            )
            .fetch_all(pool),
        )?;

        let (projects, users) = tokio::try_join!(
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM projects").fetch_all(pool),
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM users").fetch_all(pool),
        )?;

        let project_name_by_id: HashMap<Uuid, String> = projects.into_iter().collect();
        let user_name_by_id: HashMap<Uuid, String> = users.into_iter().collect();

        Ok(Self {
            by_status: status_groups
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_project: project_groups
                .into_iter()
                .map(|(project_id, count)| ProjectCount {
                    project_id,
                    project_name: project_name_by_id
                        .get(&project_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown project".to_string()),
                    count,
                })
                .collect(),
            by_user: user_groups
                .into_iter()
                .map(|(user_id, count)| UserCount {
                    user_id,
                    user_name: user_name_by_id
                        .get(&user_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown user".to_string()),
                    count,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_with_camel_case_groups() {
        let summary = DashboardSummary {
            by_status: vec![StatusCount {
                status: TaskStatus::Todo,
                count: 3,
            }],
            by_project: vec![],
            by_user: vec![],
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("byStatus").is_some());
        assert!(json.get("byProject").is_some());
        assert!(json.get("byUser").is_some());
        assert_eq!(json["byStatus"][0]["status"], "todo");
        assert_eq!(json["byStatus"][0]["count"], 3);
    }

    // Aggregation queries are covered in tests/store_tests.rs
}
