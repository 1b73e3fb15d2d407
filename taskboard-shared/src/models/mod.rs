/// Database models for Taskboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles, and the user-deletion cascade
/// - `project`: Projects owned by users
/// - `task`: Tasks, their lifecycle rules, filtering, and atomic updates
/// - `activity`: Append-only per-task activity log
/// - `dashboard`: Read-only aggregate counts over tasks
///
/// Models follow a common shape: a `FromRow` struct per table, a `Create*`
/// input struct, and associated functions taking a `&PgPool`. Cascading
/// deletions are explicit transactions that remove dependent rows in
/// dependency order (activity, then tasks, then projects/users).

pub mod activity;
pub mod dashboard;
pub mod project;
pub mod task;
pub mod user;
