use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::core::config::{SearchProviderKind, SearchSettings};
use crate::core::errors::AgentError;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub snippet: String,
}

impl SearchResult {
    /// Builds a result from raw provider fields. Returns `None` for entries
    /// with neither a title nor a link.
    pub fn from_parts(title: &str, link: &str, snippet: &str) -> Option<Self> {
        let title = title.trim();
        let link = link.trim();
        if title.is_empty() && link.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            link: (!link.is_empty()).then(|| link.to_string()),
            snippet: snippet.trim().to_string(),
        })
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns at most `max_results` hits in provider order.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, AgentError>;
}

/// Dispatches to the configured web search backend, or to DuckDuckGo HTML
/// when the configured one lacks credentials.
pub struct WebSearch {
    client: Client,
    settings: SearchSettings,
    provider: SearchProviderKind,
}

impl WebSearch {
    pub fn new(settings: SearchSettings) -> Result<Self, AgentError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(AgentError::internal)?;
        let provider = effective_provider(&settings);
        Ok(Self {
            client,
            settings,
            provider,
        })
    }
}

fn effective_provider(s: &SearchSettings) -> SearchProviderKind {
    let has_keys = match s.provider {
        SearchProviderKind::Google => s.google_api_key.is_some() && s.google_engine_id.is_some(),
        SearchProviderKind::Brave => s.brave_api_key.is_some(),
        SearchProviderKind::Bing => s.bing_api_key.is_some(),
        SearchProviderKind::DuckDuckGo | SearchProviderKind::DuckDuckGoHtml => true,
    };
    if has_keys {
        s.provider
    } else {
        tracing::warn!(
            "Search provider {:?} is missing API credentials, falling back to DuckDuckGo",
            s.provider
        );
        SearchProviderKind::DuckDuckGoHtml
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    fn name(&self) -> &str {
        match self.provider {
            SearchProviderKind::DuckDuckGoHtml => "duckduckgo_html",
            SearchProviderKind::DuckDuckGo => "duckduckgo",
            SearchProviderKind::Google => "google",
            SearchProviderKind::Brave => "brave",
            SearchProviderKind::Bing => "bing",
        }
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, AgentError> {
        let s = &self.settings;
        let mut results = match self.provider {
            SearchProviderKind::DuckDuckGoHtml => duckduckgo_html_search(&self.client, query).await?,
            SearchProviderKind::DuckDuckGo => duckduckgo_search(&self.client, query).await?,
            SearchProviderKind::Google => {
                google_search(
                    &self.client,
                    query,
                    s.google_api_key.as_deref().unwrap_or_default(),
                    s.google_engine_id.as_deref().unwrap_or_default(),
                    max_results,
                )
                .await?
            }
            SearchProviderKind::Brave => {
                brave_search(
                    &self.client,
                    query,
                    s.brave_api_key.as_deref().unwrap_or_default(),
                    max_results,
                )
                .await?
            }
            SearchProviderKind::Bing => {
                bing_search(
                    &self.client,
                    query,
                    s.bing_api_key.as_deref().unwrap_or_default(),
                    max_results,
                )
                .await?
            }
        };
        results.truncate(max_results);
        Ok(results)
    }
}

fn ensure_success(provider: &str, response: &reqwest::Response) -> Result<(), AgentError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(AgentError::Provider(format!(
        "{} search failed: {}",
        provider,
        response.status()
    )))
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleResponse {
    fn into_results(self) -> Vec<SearchResult> {
        self.items
            .iter()
            .filter_map(|item| SearchResult::from_parts(&item.title, &item.link, &item.snippet))
            .collect()
    }
}

async fn google_search(
    client: &Client,
    query: &str,
    api_key: &str,
    engine_id: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, AgentError> {
    let url = format!(
        "https://www.googleapis.com/customsearch/v1?key={}&cx={}&q={}&num={}",
        api_key,
        engine_id,
        urlencoding::encode(query),
        max_results.min(10)
    );

    let response = client.get(url).send().await.map_err(AgentError::provider)?;
    ensure_success("Google", &response)?;

    let payload: GoogleResponse = response.json().await.map_err(AgentError::from_body)?;
    Ok(payload.into_results())
}

#[derive(Deserialize)]
struct DdgResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "Results", default)]
    results: Vec<DdgTopic>,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DdgTopic>,
}

#[derive(Deserialize)]
struct DdgTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
    #[serde(rename = "Topics", default)]
    topics: Vec<DdgTopic>,
}

async fn duckduckgo_search(client: &Client, query: &str) -> Result<Vec<SearchResult>, AgentError> {
    let url = format!(
        "https://api.duckduckgo.com/?q={}&format=json&no_redirect=1&no_html=1",
        urlencoding::encode(query)
    );

    let response = client.get(url).send().await.map_err(AgentError::provider)?;
    ensure_success("DuckDuckGo", &response)?;

    let payload: DdgResponse = response.json().await.map_err(AgentError::from_body)?;
    Ok(parse_ddg_instant_answer(&payload))
}

fn parse_ddg_instant_answer(payload: &DdgResponse) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !payload.abstract_text.is_empty() && !payload.abstract_url.is_empty() {
        let title = if payload.heading.is_empty() {
            payload
                .abstract_text
                .split(" - ")
                .next()
                .unwrap_or(&payload.abstract_text)
        } else {
            &payload.heading
        };
        results.extend(SearchResult::from_parts(
            title,
            &payload.abstract_url,
            &payload.abstract_text,
        ));
    }

    extract_ddg_topics(&payload.results, &mut results);
    extract_ddg_topics(&payload.related_topics, &mut results);
    results
}

fn extract_ddg_topics(items: &[DdgTopic], results: &mut Vec<SearchResult>) {
    for item in items {
        if !item.topics.is_empty() {
            extract_ddg_topics(&item.topics, results);
            continue;
        }
        if item.text.is_empty() || item.first_url.is_empty() {
            continue;
        }
        let title = item.text.split(" - ").next().unwrap_or(&item.text);
        results.extend(SearchResult::from_parts(title, &item.first_url, &item.text));
    }
}

async fn duckduckgo_html_search(
    client: &Client,
    query: &str,
) -> Result<Vec<SearchResult>, AgentError> {
    let response = client
        .post("https://html.duckduckgo.com/html/")
        .form(&[("q", query)])
        .header("Accept", "text/html")
        .send()
        .await
        .map_err(AgentError::provider)?;
    ensure_success("DuckDuckGo", &response)?;

    let body = response.text().await.map_err(AgentError::provider)?;
    parse_ddg_html(&body)
}

/// Parses the DuckDuckGo HTML results page. A page with neither result
/// blocks nor the "no results" marker is treated as off-schema (captcha,
/// layout change).
fn parse_ddg_html(body: &str) -> Result<Vec<SearchResult>, AgentError> {
    let doc = Html::parse_document(body);

    let result_sel = selector(".result")?;
    let link_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let empty_sel = selector(".no-results")?;

    let mut results = Vec::new();
    let mut blocks = 0usize;
    for block in doc.select(&result_sel) {
        blocks += 1;
        let classes = block.value().attr("class").unwrap_or_default();
        if classes.contains("result--ad") {
            continue;
        }

        let anchor = block.select(&link_sel).next();
        let title = anchor
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let link = anchor
            .and_then(|el| el.value().attr("href"))
            .map(extract_ddg_url)
            .unwrap_or_default();
        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        results.extend(SearchResult::from_parts(&title, &link, &snippet));
    }

    if blocks == 0 && doc.select(&empty_sel).next().is_none() {
        return Err(AgentError::Parse(
            "DuckDuckGo page contained no result list".to_string(),
        ));
    }

    Ok(results)
}

fn selector(css: &str) -> Result<Selector, AgentError> {
    Selector::parse(css).map_err(|e| AgentError::internal(format!("bad selector {}: {:?}", css, e)))
}

/// DuckDuckGo wraps result links as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`.
fn extract_ddg_url(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        if let Ok(decoded) = urlencoding::decode(&href[start..end]) {
            return decoded.into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    href.to_string()
}

#[derive(Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveItem>,
}

#[derive(Deserialize)]
struct BraveItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

impl BraveResponse {
    fn into_results(self) -> Vec<SearchResult> {
        self.web
            .map(|web| web.results)
            .unwrap_or_default()
            .iter()
            .filter_map(|item| SearchResult::from_parts(&item.title, &item.url, &item.description))
            .collect()
    }
}

async fn brave_search(
    client: &Client,
    query: &str,
    api_key: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, AgentError> {
    let url = format!(
        "https://api.search.brave.com/res/v1/web/search?q={}&count={}",
        urlencoding::encode(query),
        max_results
    );

    let response = client
        .get(url)
        .header("X-Subscription-Token", api_key)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(AgentError::provider)?;
    ensure_success("Brave", &response)?;

    let payload: BraveResponse = response.json().await.map_err(AgentError::from_body)?;
    Ok(payload.into_results())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    #[serde(default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingItem>,
}

#[derive(Deserialize)]
struct BingItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

impl BingResponse {
    fn into_results(self) -> Vec<SearchResult> {
        self.web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .iter()
            .filter_map(|item| SearchResult::from_parts(&item.name, &item.url, &item.snippet))
            .collect()
    }
}

async fn bing_search(
    client: &Client,
    query: &str,
    api_key: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, AgentError> {
    let url = format!(
        "https://api.bing.microsoft.com/v7.0/search?q={}&count={}",
        urlencoding::encode(query),
        max_results
    );

    let response = client
        .get(url)
        .header("Ocp-Apim-Subscription-Key", api_key)
        .send()
        .await
        .map_err(AgentError::provider)?;
    ensure_success("Bing", &response)?;

    let payload: BingResponse = response.json().await.map_err(AgentError::from_body)?;
    Ok(payload.into_results())
}
