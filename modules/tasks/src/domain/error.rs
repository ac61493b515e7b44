use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Task title is required")]
    TitleRequired,

    #[error("Review text is required")]
    ReviewRequired,

    #[error("Task not found: {id}")]
    TaskNotFound { id: i64 },

    #[error("Task has validation warnings")]
    ValidationFailed { warnings: Vec<String> },

    /// First-failure check refused an overwrite.
    #[error("{message}")]
    UpdateRejected { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(e: sqlx::Error) -> Self {
        Self::database(e.to_string())
    }
}
