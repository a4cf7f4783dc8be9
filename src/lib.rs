pub mod agent;
pub mod chat;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;
