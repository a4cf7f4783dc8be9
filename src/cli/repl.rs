use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use super::render::render_result;
use crate::agent::SearchAgent;
use crate::chat::ChatSession;
use crate::llm::LlmProvider;

pub const EXIT_KEYWORDS: [&str; 4] = ["quit", "exit", "q", ":q"];

const SEARCH_PROMPT: &str = "Enter search query: ";
const CHAT_PROMPT: &str = "You: ";
const CLEAR_COMMAND: &str = "/clear";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Exit,
    Empty,
    Text(String),
}

pub fn classify_input(line: &str) -> PromptInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return PromptInput::Empty;
    }
    let lowered = trimmed.to_lowercase();
    if EXIT_KEYWORDS.contains(&lowered.as_str()) {
        return PromptInput::Exit;
    }
    PromptInput::Text(trimmed.to_string())
}

enum Prompted {
    Input(PromptInput),
    Interrupted,
}

/// Prints `prompt` and waits for one line. End of input counts as an exit.
async fn next_input<R, W>(lines: &mut Lines<R>, out: &mut W, prompt: &str) -> io::Result<Prompted>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", prompt)?;
    out.flush()?;

    tokio::select! {
        line = lines.next_line() => Ok(Prompted::Input(match line? {
            Some(line) => classify_input(&line),
            None => PromptInput::Exit,
        })),
        _ = tokio::signal::ctrl_c() => Ok(Prompted::Interrupted),
    }
}

/// Reads queries until an exit keyword or end of input. Per-query errors and
/// Ctrl-C are reported and the loop keeps going.
pub async fn run_search_loop<R, W>(
    agent: &SearchAgent,
    input: R,
    out: &mut W,
    verbose: bool,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(out)?;
    writeln!(out, "AI Search Agent Activated")?;
    writeln!(out, "Type your query or 'quit' to exit.")?;
    writeln!(out)?;

    loop {
        let query = match next_input(&mut lines, out, SEARCH_PROMPT).await? {
            Prompted::Interrupted => {
                writeln!(out, "\n\nSearch interrupted. Returning to main menu.")?;
                continue;
            }
            Prompted::Input(PromptInput::Exit) => {
                writeln!(out, "\nThank you for using AI Search Agent. Goodbye!")?;
                break;
            }
            Prompted::Input(PromptInput::Empty) => {
                writeln!(out, "Please enter a valid search query.")?;
                continue;
            }
            Prompted::Input(PromptInput::Text(query)) => query,
        };

        let outcome = tokio::select! {
            result = agent.process_query(&query) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(Ok(result)) => render_result(out, &result, verbose)?,
            Some(Err(err)) => {
                tracing::error!("Query '{}' failed: {}", query, err);
                writeln!(out, "An error occurred: {}", err)?;
            }
            None => {
                tracing::info!("Query '{}' interrupted", query);
                writeln!(out, "\n\nSearch interrupted. Returning to main menu.")?;
            }
        }
    }

    Ok(())
}

/// Chat counterpart of `run_search_loop`; `/clear` resets the session.
pub async fn run_chat_loop<R, W>(
    provider: &dyn LlmProvider,
    session: &mut ChatSession,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(out)?;
    writeln!(out, "Chatting with {}. Type '/clear' to reset or 'quit' to exit.", session.model())?;
    writeln!(out)?;

    loop {
        let prompt = match next_input(&mut lines, out, CHAT_PROMPT).await? {
            Prompted::Interrupted => {
                writeln!(out, "\n\nInterrupted.")?;
                continue;
            }
            Prompted::Input(PromptInput::Exit) => {
                writeln!(out, "\nGoodbye!")?;
                break;
            }
            Prompted::Input(PromptInput::Empty) => {
                writeln!(out, "Please enter a message.")?;
                continue;
            }
            Prompted::Input(PromptInput::Text(text)) if text == CLEAR_COMMAND => {
                session.clear();
                writeln!(out, "Conversation cleared.")?;
                continue;
            }
            Prompted::Input(PromptInput::Text(text)) => text,
        };

        let outcome = tokio::select! {
            result = session.send(provider, &prompt) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(Ok(reply)) => writeln!(out, "AI: {}\n", reply)?,
            Some(Err(err)) => {
                tracing::error!("Chat turn failed: {}", err);
                writeln!(out, "An error occurred: {}", err)?;
            }
            None => writeln!(out, "\n\nInterrupted.")?,
        }
    }

    Ok(())
}
