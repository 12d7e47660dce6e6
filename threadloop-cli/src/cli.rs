use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "threadloop",
    version,
    about = "Tool-calling HR assistant with resumable conversation threads"
)]
pub struct Cli {
    /// Path to the TOML configuration (defaults to config/agent.toml)
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long, value_enum, default_value_t = RunMode::Chat)]
    pub mode: RunMode,
    /// Thread to continue; `chat` starts a new one when omitted
    #[arg(long)]
    pub thread: Option<String>,
    /// Overrides `server.bind` in `rest` mode
    #[arg(long)]
    pub addr: Option<SocketAddr>,
    #[arg()]
    pub prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Send one message and print the answer
    Chat,
    /// Print the stored checkpoint of a thread
    History,
    /// Serve the REST API
    Rest,
}
