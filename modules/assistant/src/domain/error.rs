use thiserror::Error;

use crate::contract::error::LlmError;

#[derive(Error, Debug)]
pub enum AssistantError {
    /// Required request input is missing or blank.
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("Unrecognized intent")]
    UnrecognizedIntent { intent: String },

    #[error("No matching task found")]
    NoMatchingTask,

    #[error("Task not found")]
    TaskNotFound,

    /// The task change failed the first-failure check.
    #[error("{message}")]
    Rejected { message: String },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for AssistantError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<tasks::TasksError>() {
            Some(tasks::TasksError::NotFound { .. }) => Self::TaskNotFound,
            Some(tasks::TasksError::Rejected { message }) => Self::Rejected {
                message: message.clone(),
            },
            Some(tasks::TasksError::Validation { warnings }) => Self::Rejected {
                message: warnings.first().cloned().unwrap_or_else(|| e.to_string()),
            },
            _ => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}
