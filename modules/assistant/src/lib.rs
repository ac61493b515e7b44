//! Natural-language assistant: intent classification, field extraction and
//! review/summary drafting through a pluggable [`LlmClient`].

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
mod module;

pub use config::AssistantConfig;
pub use contract::{client::LlmClient, error::LlmError};
pub use infra::llm::GeminiClient;
pub use module::{AssistantModule, MODULE_NAME};
