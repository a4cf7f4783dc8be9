use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::provider::LlmProvider;
use super::types::{ChatRequest, ProviderModel};
use crate::core::errors::AgentError;

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagInfo>,
}

#[derive(Deserialize)]
struct TagInfo {
    name: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

fn build_options(request: &ChatRequest) -> Map<String, Value> {
    let mut options = Map::new();
    if let Some(t) = request.temperature {
        options.insert("temperature".to_string(), json!(t));
    }
    if let Some(t) = request.top_p {
        options.insert("top_p".to_string(), json!(t));
    }
    if let Some(t) = request.max_tokens {
        options.insert("num_predict".to_string(), json!(t));
    }
    if let Some(s) = &request.stop {
        options.insert("stop".to_string(), json!(s));
    }
    options
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        let url = format!("{}/api/version", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, AgentError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AgentError::provider)?;

        if !res.status().is_success() {
            return Err(AgentError::Provider(format!(
                "Failed to list models: {}",
                res.status()
            )));
        }

        let response: TagsResponse = res.json().await.map_err(AgentError::from_body)?;
        Ok(response
            .models
            .into_iter()
            .map(|m| ProviderModel {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AgentError> {
        let url = format!("{}/api/chat", self.base_url);
        let options = build_options(&request);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });
        if !options.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("options".to_string(), Value::Object(options));
            }
        }

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AgentError::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(AgentError::Generation(format!(
                "Ollama chat error ({}): {}",
                status, text
            )));
        }

        let payload: ChatResponse = res.json().await.map_err(AgentError::from_body)?;
        Ok(payload.message.content)
    }
}
