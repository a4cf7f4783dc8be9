// Single source for the model default: the CLI and `SearchAgent` both read it.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_CHAT_TEMPERATURE: f64 = 0.7;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_LMSTUDIO_URL: &str = "http://localhost:1234";

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const MAX_RESULTS_LIMIT: usize = 20;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_MAX_CHARS: usize = 6000;
pub const DEFAULT_FETCH_MAX_BYTES: usize = 1_000_000;

pub const DEFAULT_LOG_FILE: &str = "search_agent.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn default_url_denylist() -> Vec<String> {
    [
        "localhost",
        "*.localhost",
        "127.0.0.1",
        "0.0.0.0",
        "192.168.*",
        "10.*",
        "172.16.*",
        "172.17.*",
        "172.18.*",
        "172.19.*",
        "172.20.*",
        "172.21.*",
        "172.22.*",
        "172.23.*",
        "172.24.*",
        "172.25.*",
        "172.26.*",
        "172.27.*",
        "172.28.*",
        "172.29.*",
        "172.30.*",
        "172.31.*",
        "169.254.*",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
