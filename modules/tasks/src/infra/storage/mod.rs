pub mod repo;

pub use repo::{TaskRow, TasksRepo};
