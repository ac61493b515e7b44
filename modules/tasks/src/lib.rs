//! Task storage, the field validator and the task REST endpoints.
//!
//! The validator ([`validate_task`], [`check_update`]) is pure and usable on
//! its own; the assistant module reaches stored tasks through [`TasksApi`].

pub mod api;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;
mod module;

pub use contract::{
    client::TasksApi,
    error::TasksError,
    model::{Task, TaskFields, ValidationReport, SENTINEL},
};
pub use domain::normalize::for_storage;
pub use domain::validation::{check_update, is_absent, validate_task};
pub use module::{MODULE_NAME, TasksModule};
