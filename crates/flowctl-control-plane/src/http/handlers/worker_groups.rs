//! Worker group handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::warn;

use flowctl_core::WorkerGroup;

use crate::http::handlers::acting_user;
use crate::http::responses::{
    ApiError, ApiResponse, CreateWorkerGroupRequest, WorkerGroupResponse,
};
use crate::service::WorkerGroupView;
use crate::state::AppState;

impl From<WorkerGroupView> for WorkerGroupResponse {
    fn from(view: WorkerGroupView) -> Self {
        Self {
            name: view.group.name,
            description: view.group.description,
            addresses: view.group.addresses,
            live_workers: view.live_members.into_iter().map(|m| m.address).collect(),
            registry_only: view.registry_only,
        }
    }
}

/// List every known worker group with its live workers.
pub async fn list_worker_groups(
    State(state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<WorkerGroupResponse>>, ApiError> {
    let views = state.worker_groups.list_worker_groups().await.map_err(|e| {
        warn!(error = %e, "Failed to list worker groups");
        ApiError::from(e)
    })?;
    Ok(ApiResponse::success(
        views.into_iter().map(WorkerGroupResponse::from).collect(),
    ))
}

/// Create a worker group.
pub async fn create_worker_group(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateWorkerGroupRequest>,
) -> Result<ApiResponse<WorkerGroup>, ApiError> {
    let user = acting_user(&state, &headers).await?;

    let mut group = WorkerGroup::new(req.name).with_description(req.description);
    group.addresses = req.addresses;

    let created = state.worker_groups.create_worker_group(&user, group).await?;
    Ok(ApiResponse::success(created))
}

/// Delete a worker group.
pub async fn delete_worker_group(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<ApiResponse<String>, ApiError> {
    let user = acting_user(&state, &headers).await?;
    state.worker_groups.delete_worker_group(&user, &name).await?;
    Ok(ApiResponse::success(name))
}
