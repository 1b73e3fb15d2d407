/// Dashboard endpoint
///
/// # Endpoints
///
/// - `GET /dashboard` - Aggregate task counts by status, project, and
///   assignee, computed fresh from the store on every call

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskboard_shared::{auth::principal::CurrentUser, models::dashboard::DashboardSummary};

/// Dashboard summary handler
///
/// # Response
///
/// ```json
/// {
///   "byStatus": [{ "status": "todo", "count": 4 }],
///   "byProject": [{ "project_id": "…", "project_name": "Website", "count": 3 }],
///   "byUser": [{ "user_id": "…", "user_name": "Jane", "count": 2 }]
/// }
/// ```
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(_current_user): Extension<CurrentUser>,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = DashboardSummary::load(&state.db).await?;

    Ok(Json(summary))
}
