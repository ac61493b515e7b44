use chrono::Datelike;
use tracing::{debug, info, instrument};

use crate::contract::model::{Analytics, BatchFailure, BatchOutcome, Task, TaskFields};
use crate::domain::{
    error::DomainError,
    normalize::for_storage,
    validation::{check_update, parse_schedule_date, validate_task},
};
use crate::infra::storage::TasksRepo;

/// `completed / total` as a whole percentage, ties to even.
pub fn completion_rate(total: i64, completed: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round_ties_even() as i64
}

pub struct Service {
    repo: TasksRepo,
}

impl Service {
    pub fn new(repo: TasksRepo) -> Self {
        Self { repo }
    }

    pub async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, DomainError> {
        Ok(self.repo.list(user_id).await?)
    }

    pub async fn get_task(&self, user_id: i64, id: i64) -> Result<Task, DomainError> {
        self.repo
            .get(user_id, id)
            .await?
            .ok_or_else(|| DomainError::task_not_found(id))
    }

    /// Validate, normalize and insert. Nothing is stored when validation warns.
    #[instrument(skip(self, fields), fields(title = %fields.task_title))]
    pub async fn create_task(&self, user_id: i64, fields: TaskFields) -> Result<Task, DomainError> {
        let fields = Self::validated(fields)?;
        let id = self.repo.insert(user_id, &fields).await?;
        info!(task_id = id, "task created");
        self.get_task(user_id, id).await
    }

    #[instrument(skip(self, fields))]
    pub async fn update_task(
        &self,
        user_id: i64,
        id: i64,
        fields: TaskFields,
    ) -> Result<Task, DomainError> {
        let fields = Self::validated(fields)?;
        if !self.repo.update(user_id, id, &fields).await? {
            return Err(DomainError::task_not_found(id));
        }
        info!(task_id = id, "task updated");
        self.get_task(user_id, id).await
    }

    /// Overwrite after [`check_update`]; the bucket rule is not enforced here.
    #[instrument(skip(self, fields))]
    pub async fn overwrite_checked(
        &self,
        user_id: i64,
        id: i64,
        fields: TaskFields,
    ) -> Result<Task, DomainError> {
        check_update(&fields).map_err(|m| DomainError::UpdateRejected {
            message: m.to_string(),
        })?;
        let fields = for_storage(fields);
        if !self.repo.update(user_id, id, &fields).await? {
            return Err(DomainError::task_not_found(id));
        }
        info!(task_id = id, "task overwritten from assistant");
        self.get_task(user_id, id).await
    }

    pub async fn add_review(&self, user_id: i64, id: i64, review: &str) -> Result<(), DomainError> {
        let review = review.trim();
        if review.is_empty() {
            return Err(DomainError::ReviewRequired);
        }
        if !self.repo.set_review(user_id, id, review).await? {
            return Err(DomainError::task_not_found(id));
        }
        debug!(task_id = id, "review stored");
        Ok(())
    }

    pub async fn toggle_complete(&self, user_id: i64, id: i64) -> Result<Task, DomainError> {
        if !self.repo.toggle_completed(user_id, id).await? {
            return Err(DomainError::task_not_found(id));
        }
        self.get_task(user_id, id).await
    }

    pub async fn delete_task(&self, user_id: i64, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete(user_id, id).await? {
            return Err(DomainError::task_not_found(id));
        }
        info!(task_id = id, "task deleted");
        Ok(())
    }

    /// Insert every valid task; report the rest by position.
    #[instrument(skip(self, batch), fields(size = batch.len()))]
    pub async fn create_batch(
        &self,
        user_id: i64,
        batch: Vec<TaskFields>,
    ) -> Result<BatchOutcome, DomainError> {
        let mut outcome = BatchOutcome {
            created: Vec::new(),
            failed: Vec::new(),
        };
        for (index, fields) in batch.into_iter().enumerate() {
            let title = fields.task_title.clone();
            match self.create_task(user_id, fields).await {
                Ok(task) => outcome.created.push(task),
                Err(DomainError::ValidationFailed { warnings }) => {
                    outcome.failed.push(BatchFailure {
                        index,
                        task_title: title,
                        warnings,
                    })
                }
                Err(DomainError::TitleRequired) => outcome.failed.push(BatchFailure {
                    index,
                    task_title: title,
                    warnings: vec![DomainError::TitleRequired.to_string()],
                }),
                Err(e) => return Err(e),
            }
        }
        info!(
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            "batch processed"
        );
        Ok(outcome)
    }

    pub async fn analytics(&self, user_id: i64) -> Result<Analytics, DomainError> {
        let (total, completed) = self.repo.counts(user_id).await?;
        Ok(Analytics {
            completion_rate: completion_rate(total, completed),
            priority_distribution: self.repo.priority_distribution(user_id).await?,
            tag_distribution: self.repo.tag_distribution(user_id).await?,
            total_tasks: total,
            completed_tasks: completed,
        })
    }

    /// Scheduled tasks whose DD/MM/YYYY date falls in `month`/`year`.
    /// Rows with unparsable dates are skipped.
    pub async fn calendar(
        &self,
        user_id: i64,
        month: u32,
        year: i32,
    ) -> Result<Vec<Task>, DomainError> {
        let tasks = self.repo.scheduled(user_id).await?;
        Ok(tasks
            .into_iter()
            .filter(|t| {
                parse_schedule_date(t.schedule_date.trim())
                    .is_some_and(|d| d.month() == month && d.year() == year)
            })
            .collect())
    }

    pub async fn find_by_title(
        &self,
        user_id: i64,
        title: &str,
        date: Option<&str>,
    ) -> Result<Option<Task>, DomainError> {
        Ok(self.repo.find_matching(user_id, title.trim(), date).await?)
    }

    pub async fn tasks_on_date(&self, user_id: i64, date: &str) -> Result<Vec<Task>, DomainError> {
        Ok(self.repo.on_date(user_id, date).await?)
    }

    fn validated(fields: TaskFields) -> Result<TaskFields, DomainError> {
        if fields.task_title.trim().is_empty() {
            return Err(DomainError::TitleRequired);
        }
        let report = validate_task(&fields);
        if !report.is_valid {
            debug!(warnings = ?report.warnings, "task rejected by validation");
            return Err(DomainError::ValidationFailed {
                warnings: report.warnings,
            });
        }
        Ok(for_storage(report.normalized))
    }
}
