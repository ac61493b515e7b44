use async_trait::async_trait;

use crate::contract::error::LlmError;

/// Text-in, text-out access to a language model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
