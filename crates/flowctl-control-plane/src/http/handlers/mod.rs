//! HTTP request handlers.

use axum::http::HeaderMap;

use flowctl_core::{Status, User};

use crate::http::responses::ApiError;
use crate::store::UserDirectory;
use crate::state::AppState;

mod health;
mod projects;
mod worker_groups;

pub use health::health_check;
pub use projects::{assign_worker_groups, query_worker_groups};
pub use worker_groups::{create_worker_group, delete_worker_group, list_worker_groups};

/// Header naming the acting user.
pub const USER_HEADER: &str = "x-flowctl-user";

/// Resolve the acting user from the request headers.
pub(crate) async fn acting_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let name = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::new(Status::UserNoOperationPerm, format!("missing {USER_HEADER} header"))
        })?;

    match state.users.find_user_by_name(name).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ApiError::new(
            Status::UserNoOperationPerm,
            format!("unknown user '{name}'"),
        )),
        Err(e) => Err(ApiError::new(Status::InternalError, e.to_string())),
    }
}
