pub mod lmstudio;
pub mod ollama;
pub mod provider;
pub mod service;
pub mod types;

mod tests;

pub use provider::LlmProvider;
pub use service::{build_provider, ensure_model_available};
pub use types::{ChatMessage, ChatRequest, ProviderModel};
