pub mod error;
pub mod extraction;
pub mod prompts;
pub mod service;
