//! HTTP server for the control plane.
//!
//! Provides endpoints for:
//! - Worker group listing and management (`/v1/worker-groups`)
//! - Project worker group bindings (`/v1/projects/:code/worker-groups`)
//! - Health check (`/health`)
//!
//! The acting user is named by the `x-flowctl-user` header.

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

mod handlers;
pub mod responses;

pub use handlers::USER_HEADER;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/v1/worker-groups",
            get(handlers::list_worker_groups).post(handlers::create_worker_group),
        )
        .route("/v1/worker-groups/:name", delete(handlers::delete_worker_group))
        .route(
            "/v1/projects/:code/worker-groups",
            get(handlers::query_worker_groups).put(handlers::assign_worker_groups),
        )
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .with_state(state)
}
