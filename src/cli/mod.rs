pub mod args;
pub mod render;
pub mod repl;

pub use args::{Cli, Command};
pub use repl::{classify_input, run_chat_loop, run_search_loop, PromptInput};
