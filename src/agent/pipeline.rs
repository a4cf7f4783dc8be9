use std::sync::Arc;

use serde::Serialize;

use super::summarizer::Summarizer;
use crate::core::config::settings::clamp_result_count;
use crate::core::config::AgentSettings;
use crate::core::errors::AgentError;
use crate::llm::LlmProvider;
use crate::tools::{ContentFetcher, SearchProvider, SearchResult, WebSearch};

/// Outcome of one query. Built once and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub query: String,
    pub search_results: Vec<SearchResult>,
    pub summary: String,
    /// URLs whose text reached the summarizer, in fetch order.
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

/// Search -> fetch -> summarize, one linear pass per query.
pub struct SearchAgent {
    search: Arc<dyn SearchProvider>,
    fetcher: ContentFetcher,
    summarizer: Summarizer,
    max_results: usize,
}

impl SearchAgent {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: ContentFetcher,
        summarizer: Summarizer,
        max_results: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            summarizer,
            max_results: clamp_result_count(max_results),
        }
    }

    pub fn from_settings(
        settings: &AgentSettings,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self, AgentError> {
        let search = Arc::new(WebSearch::new(settings.search.clone())?);
        let fetcher = ContentFetcher::new(settings.fetch.clone())?;
        let summarizer = Summarizer::new(llm, settings.llm.model.clone(), settings.llm.temperature);
        Ok(Self::new(search, fetcher, summarizer, settings.search.max_results))
    }

    /// Never fails: a provider error yields no results plus the error for
    /// display.
    pub async fn search_web(
        &self,
        query: &str,
        count: usize,
    ) -> (Vec<SearchResult>, Option<AgentError>) {
        let count = clamp_result_count(count);
        if count == 0 {
            return (Vec::new(), None);
        }
        match self.search.search(query, count).await {
            Ok(mut results) => {
                results.truncate(count);
                tracing::info!(
                    "Search '{}' via {} returned {} results",
                    query,
                    self.search.name(),
                    results.len()
                );
                (results, None)
            }
            Err(err) => {
                tracing::warn!("Search error for '{}': {}", query, err);
                (Vec::new(), Some(err))
            }
        }
    }

    /// Fetches every linked page and summarizes the combined text. Returns the
    /// summary and the URLs that contributed content.
    pub async fn summarize_results(
        &self,
        query: &str,
        search_results: &[SearchResult],
    ) -> Result<(String, Vec<String>), AgentError> {
        let urls: Vec<String> = search_results
            .iter()
            .filter_map(|result| result.link.clone())
            .collect();

        let content = self.fetcher.fetch_all(&urls).await;
        tracing::info!(
            "Fetched {}/{} pages for '{}'",
            content.pages.len(),
            urls.len(),
            query
        );

        let summary = self.summarizer.summarize(query, &content.blob()).await?;
        Ok((summary, content.sources()))
    }

    pub async fn process_query(&self, query: &str) -> Result<PipelineResult, AgentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::BadRequest("query is empty".to_string()));
        }

        let (search_results, search_error) = self.search_web(query, self.max_results).await;
        let (summary, sources) = self.summarize_results(query, &search_results).await?;

        Ok(PipelineResult {
            query: query.to_string(),
            search_results,
            summary,
            sources,
            search_error: search_error.map(|err| err.to_string()),
        })
    }
}
