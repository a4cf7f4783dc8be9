use std::sync::Arc;

use crate::core::errors::AgentError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

pub fn render_summary_prompt(query: &str, content: &str) -> String {
    format!(
        "You are an expert summarizer. Synthesize the following web search results \
into a comprehensive, concise summary that captures the key points:

Search Query: {query}

Web Search Results:
{content}

Summary Guidelines:
- Provide a clear, objective overview
- Highlight the most important information
- Be concise but thorough
- Use a neutral, informative tone

Detailed Summary:"
    )
}

pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
        }
    }

    /// One non-streaming generation call; the reply is returned verbatim.
    /// An empty `content` is allowed.
    pub async fn summarize(&self, query: &str, content: &str) -> Result<String, AgentError> {
        let prompt = render_summary_prompt(query, content);
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.temperature);

        tracing::debug!(
            "Summarizing {} chars for '{}' with {}",
            content.len(),
            query,
            self.model
        );
        self.llm.chat(request, &self.model).await
    }
}
