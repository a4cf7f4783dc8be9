use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::AgentSettings;

/// AI-powered web search agent.
#[derive(Debug, Clone, Parser)]
#[command(name = "search-agent", version, about)]
pub struct Cli {
    /// Model used for summarization and chat [default: llama3.2:1b]
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Number of search results to retrieve (1-20) [default: 5]
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..=20))]
    pub results: Option<u16>,

    /// Print result links and log at the configured level on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Multi-turn chat with the model instead of searching
    Chat {
        /// Sampling temperature for chat replies (0.0-2.0) [default: 0.7]
        #[arg(long)]
        temperature: Option<f64>,
    },
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply_overrides(&self, settings: &mut AgentSettings) {
        if let Some(model) = self.model.as_deref().map(str::trim) {
            if !model.is_empty() {
                settings.llm.model = model.to_string();
            }
        }
        if let Some(results) = self.results {
            settings.search.max_results = usize::from(results);
        }
    }
}
