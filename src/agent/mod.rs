pub mod pipeline;
pub mod summarizer;

pub use pipeline::{PipelineResult, SearchAgent};
pub use summarizer::Summarizer;
