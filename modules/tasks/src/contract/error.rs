use thiserror::Error;

/// Errors that are safe to expose to other modules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TasksError {
    #[error("Task not found: {id}")]
    NotFound { id: i64 },

    /// A single user-facing reason the change was refused.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Task has validation warnings")]
    Validation { warnings: Vec<String> },

    #[error("Internal error")]
    Internal,
}
