use async_trait::async_trait;

use super::types::{ChatRequest, ProviderModel};
use crate::core::errors::AgentError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "ollama", "lmstudio")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, AgentError>;

    /// list available models from the provider
    async fn list_models(&self) -> Result<Vec<ProviderModel>, AgentError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AgentError>;
}
