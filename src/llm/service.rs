use std::sync::Arc;

use crate::core::config::{LlmProviderKind, LlmSettings};
use crate::core::errors::AgentError;
use crate::llm::lmstudio::LmStudioProvider;
use crate::llm::ollama::OllamaProvider;
use crate::llm::provider::LlmProvider;

pub fn build_provider(settings: &LlmSettings) -> Arc<dyn LlmProvider> {
    match settings.provider {
        LlmProviderKind::Ollama => Arc::new(OllamaProvider::new(settings.base_url.clone())),
        LlmProviderKind::LmStudio => Arc::new(LmStudioProvider::new(settings.base_url.clone())),
    }
}

/// Startup gate: the provider must answer and must serve `model`.
pub async fn ensure_model_available(
    provider: &dyn LlmProvider,
    model: &str,
) -> Result<(), AgentError> {
    if !provider.health_check().await? {
        return Err(AgentError::Provider(format!(
            "{} is not reachable",
            provider.name()
        )));
    }

    let models = provider.list_models().await?;
    if models.iter().any(|m| model_matches(&m.id, model)) {
        tracing::info!("Using model '{}' via {}", model, provider.name());
        return Ok(());
    }

    let available: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    Err(AgentError::BadRequest(format!(
        "model '{}' is not available from {} (available: {})",
        model,
        provider.name(),
        if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        }
    )))
}

/// Ollama lists untagged pulls as `name:latest`.
pub(crate) fn model_matches(available: &str, requested: &str) -> bool {
    if available == requested {
        return true;
    }
    !requested.contains(':') && available.strip_suffix(":latest") == Some(requested)
}
