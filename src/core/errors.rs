use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("unexpected response format: {0}")]
    Parse(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Internal(err.to_string())
    }

    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Provider(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        AgentError::Generation(err.to_string())
    }

    /// Maps a `reqwest` failure while reading a JSON body: a decode failure
    /// means the provider answered with something off-schema, anything else
    /// is a transport problem.
    pub fn from_body(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgentError::Parse(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] AgentError),

    #[error("Failed to initialize LLM provider: {0}")]
    Llm(#[source] AgentError),

    #[error("Failed to initialize HTTP client: {0}")]
    Http(#[source] AgentError),
}
