pub mod repo;

pub use repo::{UserRow, UsersRepo};
