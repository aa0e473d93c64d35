//! What a worker knows about a running task.

use serde::{Deserialize, Serialize};

use flowctl_core::TaskInstanceId;

use crate::process::DEFAULT_TENANT;

/// A running task's process and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExecutionContext {
    pub task_instance_id: TaskInstanceId,

    /// Root OS pid; zero or negative if nothing was launched.
    pub process_id: i32,

    /// OS identity the task runs as.
    pub tenant_code: String,

    /// Host the process runs on. Informational: termination always acts
    /// on the local host, so a worker only kills tasks it launched.
    pub host: String,

    /// Key of the external runtime client serving this task, if any.
    #[serde(default)]
    pub runtime_client_key: Option<String>,
}

impl TaskExecutionContext {
    /// Create a context for a local process under the default tenant.
    pub fn new(task_instance_id: TaskInstanceId, process_id: i32) -> Self {
        Self {
            task_instance_id,
            process_id,
            tenant_code: DEFAULT_TENANT.to_string(),
            host: "localhost".to_string(),
            runtime_client_key: None,
        }
    }

    /// Builder method to set the tenant.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_code = tenant.into();
        self
    }

    /// Builder method to set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder method to set the runtime client key.
    pub fn with_runtime_client(mut self, key: impl Into<String>) -> Self {
        self.runtime_client_key = Some(key.into());
        self
    }
}
