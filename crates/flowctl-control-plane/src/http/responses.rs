//! HTTP request and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use flowctl_core::Status;

use crate::error::{BindingError, WorkerGroupError};

// ============================================================================
// Envelope
// ============================================================================

/// Every API response: status code, message, and data on success.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            code: Status::Success.code(),
            msg: Status::Success.message().to_string(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// ============================================================================
// Error types
// ============================================================================

/// An error response with its status and HTTP code.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub msg: String,
}

impl ApiError {
    /// Create an error from a status and detail message.
    pub fn new(status: Status, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
        }
    }

    fn http_status(&self) -> StatusCode {
        match self.status {
            Status::Success => StatusCode::OK,
            Status::UserNoOperationPerm => StatusCode::FORBIDDEN,
            Status::ProjectNotExist | Status::WorkerGroupNotExist => StatusCode::NOT_FOUND,
            Status::UsedWorkerGroupExists | Status::WorkerGroupNameExist => StatusCode::CONFLICT,
            Status::InvalidWorkerGroupName | Status::DeleteDefaultWorkerGroupForbidden => {
                StatusCode::BAD_REQUEST
            }
            Status::AssignWorkerGroupToProjectError
            | Status::SaveWorkerGroupError
            | Status::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.status.code(),
            msg: self.msg.clone(),
            data: None,
        };
        (self.http_status(), Json(body)).into_response()
    }
}

impl From<BindingError> for ApiError {
    fn from(e: BindingError) -> Self {
        Self::new(e.status(), e.to_string())
    }
}

impl From<WorkerGroupError> for ApiError {
    fn from(e: WorkerGroupError) -> Self {
        Self::new(e.status(), e.to_string())
    }
}

// ============================================================================
// Worker group types
// ============================================================================

/// Request body for creating a worker group.
#[derive(Debug, Deserialize)]
pub struct CreateWorkerGroupRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Static worker addresses.
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Response for a single worker group.
#[derive(Debug, Serialize)]
pub struct WorkerGroupResponse {
    pub name: String,
    pub description: String,
    pub addresses: Vec<String>,
    pub live_workers: Vec<String>,
    pub registry_only: bool,
}

// ============================================================================
// Project binding types
// ============================================================================

/// Request body for assigning worker groups to a project.
#[derive(Debug, Deserialize)]
pub struct AssignWorkerGroupsRequest {
    pub worker_groups: Vec<String>,
}
