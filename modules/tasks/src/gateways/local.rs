use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::TasksApi,
    error::TasksError,
    model::{Task, TaskFields},
};
use crate::domain::{error::DomainError, service::Service};

/// In-process [`TasksApi`] backed by the tasks service.
pub struct TasksLocalClient {
    service: Arc<Service>,
}

impl TasksLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

fn to_contract(e: DomainError) -> anyhow::Error {
    let mapped = match e {
        DomainError::TaskNotFound { id } => TasksError::NotFound { id },
        DomainError::ValidationFailed { warnings } => TasksError::Validation { warnings },
        DomainError::UpdateRejected { message } => TasksError::Rejected { message },
        DomainError::TitleRequired | DomainError::ReviewRequired => TasksError::Rejected {
            message: e.to_string(),
        },
        DomainError::Database { message } => {
            tracing::error!(error = %message, "tasks storage failure");
            TasksError::Internal
        }
    };
    mapped.into()
}

#[async_trait]
impl TasksApi for TasksLocalClient {
    async fn list_tasks(&self, user_id: i64) -> anyhow::Result<Vec<Task>> {
        self.service.list_tasks(user_id).await.map_err(to_contract)
    }

    async fn get_task(&self, user_id: i64, task_id: i64) -> anyhow::Result<Task> {
        self.service
            .get_task(user_id, task_id)
            .await
            .map_err(to_contract)
    }

    async fn find_by_title(&self, user_id: i64, title: &str) -> anyhow::Result<Option<Task>> {
        self.service
            .find_by_title(user_id, title, None)
            .await
            .map_err(to_contract)
    }

    async fn find_by_title_and_date(
        &self,
        user_id: i64,
        title: &str,
        date: &str,
    ) -> anyhow::Result<Option<Task>> {
        self.service
            .find_by_title(user_id, title, Some(date.trim()))
            .await
            .map_err(to_contract)
    }

    async fn tasks_on_date(&self, user_id: i64, date: &str) -> anyhow::Result<Vec<Task>> {
        self.service
            .tasks_on_date(user_id, date)
            .await
            .map_err(to_contract)
    }

    async fn overwrite_checked(
        &self,
        user_id: i64,
        task_id: i64,
        fields: TaskFields,
    ) -> anyhow::Result<Task> {
        self.service
            .overwrite_checked(user_id, task_id, fields)
            .await
            .map_err(to_contract)
    }
}
