//! Project worker group binding handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::warn;

use flowctl_core::ProjectCode;

use crate::http::handlers::acting_user;
use crate::http::responses::{ApiError, ApiResponse, AssignWorkerGroupsRequest};
use crate::service::{AssignOutcome, AssignedWorkerGroups};
use crate::state::AppState;

/// Replace a project's worker group bindings with the requested set.
pub async fn assign_worker_groups(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(code): Path<i64>,
    Json(req): Json<AssignWorkerGroupsRequest>,
) -> Result<ApiResponse<AssignOutcome>, ApiError> {
    let user = acting_user(&state, &headers).await?;

    let outcome = state
        .bindings
        .assign_worker_groups(&user, Some(ProjectCode::new(code)), &req.worker_groups)
        .await
        .map_err(|e| {
            if !e.is_validation() {
                warn!(project = code, error = %e, "Worker group assignment failed");
            }
            ApiError::from(e)
        })?;

    Ok(ApiResponse::success(outcome))
}

/// Current bindings of a project.
pub async fn query_worker_groups(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(code): Path<i64>,
) -> Result<ApiResponse<AssignedWorkerGroups>, ApiError> {
    let user = acting_user(&state, &headers).await?;
    let result = state
        .bindings
        .query_assigned_worker_groups(&user, ProjectCode::new(code))
        .await?;
    Ok(ApiResponse::success(result))
}
