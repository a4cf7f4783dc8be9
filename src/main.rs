use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use search_agent::agent::SearchAgent;
use search_agent::chat::ChatSession;
use search_agent::cli::{run_chat_loop, run_search_loop, Cli, Command};
use search_agent::core::config::defaults::DEFAULT_CHAT_TEMPERATURE;
use search_agent::core::config::{AgentSettings, AppPaths, ConfigService};
use search_agent::core::errors::InitializationError;
use search_agent::core::logging;
use search_agent::llm::{build_provider, ensure_model_available};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Critical error: {:#}", err);
            eprintln!("An error occurred: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let mut config_service = ConfigService::new(paths.clone());
    if let Some(path) = &cli.config {
        config_service = config_service.with_config_path(path);
    }

    let config = config_service
        .load_config()
        .map_err(InitializationError::Config)?;
    let mut settings = AgentSettings::from_config(&config);
    cli.apply_overrides(&mut settings);

    logging::init(&paths, &settings.logging, cli.verbose);
    tracing::info!(
        "Loaded config from {}: {}",
        config_service.config_path().display(),
        config_service.redact_sensitive_values(&config)
    );

    let llm = build_provider(&settings.llm);
    ensure_model_available(llm.as_ref(), &settings.llm.model)
        .await
        .map_err(InitializationError::Llm)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match cli.command {
        None => {
            let agent =
                SearchAgent::from_settings(&settings, llm).map_err(InitializationError::Http)?;
            run_search_loop(&agent, stdin, &mut stdout, cli.verbose)
                .await
                .context("search loop failed")?;
        }
        Some(Command::Chat { temperature }) => {
            let temperature = temperature
                .unwrap_or(DEFAULT_CHAT_TEMPERATURE)
                .clamp(0.0, 2.0);
            let mut session = ChatSession::new(settings.llm.model.clone(), temperature);
            run_chat_loop(llm.as_ref(), &mut session, stdin, &mut stdout)
                .await
                .context("chat loop failed")?;
        }
    }

    Ok(())
}
