use std::time::Duration;

use serde_json::Value;

use super::defaults::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Ollama,
    LmStudio,
}

impl LlmProviderKind {
    fn default_base_url(self) -> &'static str {
        match self {
            LlmProviderKind::Ollama => DEFAULT_OLLAMA_URL,
            LlmProviderKind::LmStudio => DEFAULT_LMSTUDIO_URL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchProviderKind {
    DuckDuckGoHtml,
    DuckDuckGo,
    Google,
    Brave,
    Bing,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub provider: SearchProviderKind,
    pub max_results: usize,
    pub google_api_key: Option<String>,
    pub google_engine_id: Option<String>,
    pub brave_api_key: Option<String>,
    pub bing_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_chars: usize,
    pub max_bytes: usize,
    pub block_private_hosts: bool,
    pub url_denylist: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub file: String,
}

/// Typed view over the merged YAML document. Missing or out-of-range values
/// fall back to defaults; `validate_config` has already rejected wrong types.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
}

impl AgentSettings {
    pub fn from_config(config: &Value) -> Self {
        Self {
            llm: llm_settings(config),
            search: search_settings(config),
            fetch: fetch_settings(config),
            logging: logging_settings(config),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&Value::Null)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        fetch_settings(&Value::Null)
    }
}

/// Caps a requested result count at `MAX_RESULTS_LIMIT`. Zero stays zero.
pub fn clamp_result_count(count: usize) -> usize {
    count.min(MAX_RESULTS_LIMIT)
}

fn section<'a>(config: &'a Value, name: &str, key: &str) -> Option<&'a Value> {
    config.get(name).and_then(|v| v.get(key))
}

fn section_str(config: &Value, name: &str, key: &str) -> Option<String> {
    section(config, name, key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn llm_settings(config: &Value) -> LlmSettings {
    let provider = match section_str(config, "llm", "provider").as_deref() {
        Some("lmstudio") => LlmProviderKind::LmStudio,
        _ => LlmProviderKind::Ollama,
    };
    let base_url = section_str(config, "llm", "base_url")
        .unwrap_or_else(|| provider.default_base_url().to_string());
    let model = section_str(config, "llm", "model").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let temperature = section(config, "llm", "temperature")
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_TEMPERATURE)
        .clamp(0.0, 2.0);

    LlmSettings {
        provider,
        base_url,
        model,
        temperature,
    }
}

fn search_settings(config: &Value) -> SearchSettings {
    let provider = match section_str(config, "search", "provider").as_deref() {
        Some("duckduckgo") => SearchProviderKind::DuckDuckGo,
        Some("google") => SearchProviderKind::Google,
        Some("brave") => SearchProviderKind::Brave,
        Some("bing") => SearchProviderKind::Bing,
        _ => SearchProviderKind::DuckDuckGoHtml,
    };
    let max_results = section(config, "search", "max_results")
        .and_then(|v| v.as_u64())
        .filter(|v| *v > 0)
        .map(|v| clamp_result_count(v as usize))
        .unwrap_or(DEFAULT_MAX_RESULTS);

    SearchSettings {
        provider,
        max_results,
        google_api_key: section_str(config, "search", "google_search_api_key"),
        google_engine_id: section_str(config, "search", "google_search_engine_id"),
        brave_api_key: section_str(config, "search", "brave_search_api_key"),
        bing_api_key: section_str(config, "search", "bing_search_api_key"),
    }
}

fn fetch_settings(config: &Value) -> FetchSettings {
    let timeout_secs = section(config, "fetch", "timeout_secs")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
        .clamp(1, 120);
    let max_chars = section(config, "fetch", "max_chars")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_FETCH_MAX_CHARS as u64)
        .clamp(256, 200_000) as usize;
    let max_bytes = section(config, "fetch", "max_bytes")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_FETCH_MAX_BYTES as u64)
        .clamp(1024, 10_000_000) as usize;
    let block_private_hosts = section(config, "fetch", "block_private_hosts")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    let mut url_denylist: Vec<String> = section(config, "fetch", "url_denylist")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();
    if url_denylist.is_empty() {
        url_denylist = default_url_denylist();
    }

    FetchSettings {
        timeout: Duration::from_secs(timeout_secs),
        max_chars,
        max_bytes,
        block_private_hosts,
        url_denylist,
    }
}

fn logging_settings(config: &Value) -> LoggingSettings {
    LoggingSettings {
        level: section_str(config, "logging", "level")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        file: section_str(config, "logging", "file").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    }
}
