use async_trait::async_trait;

use crate::contract::model::{Task, TaskFields};

/// Task access for other modules. Every call is scoped to one owner.
///
/// Errors carry a [`TasksError`](crate::contract::error::TasksError) inside the
/// `anyhow::Error`.
#[async_trait]
pub trait TasksApi: Send + Sync {
    async fn list_tasks(&self, user_id: i64) -> anyhow::Result<Vec<Task>>;

    async fn get_task(&self, user_id: i64, task_id: i64) -> anyhow::Result<Task>;

    /// First task whose title contains `title`, ignoring case.
    async fn find_by_title(&self, user_id: i64, title: &str) -> anyhow::Result<Option<Task>>;

    /// Like [`find_by_title`](Self::find_by_title), also requiring the schedule date to contain `date`.
    async fn find_by_title_and_date(
        &self,
        user_id: i64,
        title: &str,
        date: &str,
    ) -> anyhow::Result<Option<Task>>;

    /// Tasks scheduled exactly on `date` (DD/MM/YYYY), by priority then start time.
    async fn tasks_on_date(&self, user_id: i64, date: &str) -> anyhow::Result<Vec<Task>>;

    /// Replace every editable field after the first-failure check.
    async fn overwrite_checked(
        &self,
        user_id: i64,
        task_id: i64,
        fields: TaskFields,
    ) -> anyhow::Result<Task>;
}
