//! Multi-turn conversation state.
//!
//! A `ChatSession` owns its history; callers keep one per conversation and
//! pass it by `&mut` into each turn.

use crate::core::errors::AgentError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

#[derive(Debug, Clone)]
pub struct ChatSession {
    model: String,
    temperature: f64,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Sends `prompt` with the full history. The user turn is recorded even
    /// when generation fails; the assistant turn only on success.
    pub async fn send(
        &mut self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<String, AgentError> {
        self.history.push(ChatMessage::user(prompt));

        let request =
            ChatRequest::new(self.history.clone()).with_temperature(self.temperature);
        let reply = provider.chat(request, &self.model).await?;

        self.history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// `User: ...` / `AI: ...` lines, oldest first.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(|message| {
                let speaker = match message.role.as_str() {
                    "user" => "User",
                    "assistant" => "AI",
                    _ => "System",
                };
                format!("{}: {}", speaker, message.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
