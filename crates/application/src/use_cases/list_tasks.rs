//! Task list use case.

use std::sync::Arc;

use agrisky_domain::{TASK_PATH, Task};

use crate::error::GatewayResult;
use crate::gateway::{Gateway, RequestOptions};

/// Use case for loading the dashboard task list.
pub struct ListTasks {
    gateway: Arc<Gateway>,
}

impl ListTasks {
    /// Creates a new `ListTasks` use case.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Fetches all tasks. A `null` payload is an empty list.
    ///
    /// # Errors
    /// Returns any gateway error.
    pub async fn execute(&self, options: RequestOptions) -> GatewayResult<Vec<Task>> {
        let tasks: Option<Vec<Task>> = self.gateway.get(TASK_PATH, options).await?;
        Ok(tasks.unwrap_or_default())
    }
}
