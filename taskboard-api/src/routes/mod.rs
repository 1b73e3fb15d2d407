/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: API banner and health check
/// - `auth`: Login and current-user endpoints
/// - `users`: User management (creation and deletion are admin-only)
/// - `projects`: Project creation, listing, and admin deletion
/// - `tasks`: Task lifecycle - create, list, patch, activity log, delete
/// - `dashboard`: Read-only aggregate counts

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
