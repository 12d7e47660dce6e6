mod cli;

use clap::Parser;
use cli::{Cli, RunMode};
use serde_json::json;
use std::error::Error;
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;
use threadloop_core::config::AppConfig;
use threadloop_core::{build_agent, server};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_tracing();
    let cli = Cli::parse();
    info!("Starting threadloop");
    debug!(mode = ?cli.mode, config = ?cli.config, thread = ?cli.thread, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration using default path or defaults");
    }
    if let Some(addr) = cli.addr {
        config.server.bind = addr;
    }

    let agent = Arc::new(build_agent(&config).await?);

    match cli.mode {
        RunMode::Chat => {
            let prompt = load_prompt(&cli)?;
            let outcome = agent.invoke(cli.thread.clone(), prompt).await?;
            let output = json!({
                "thread_id": outcome.thread_id,
                "response": outcome.response,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        RunMode::History => {
            let thread_id = cli
                .thread
                .as_deref()
                .ok_or("--thread is required in history mode")?;
            match agent.checkpoint(thread_id).await? {
                Some(checkpoint) => {
                    let output = json!({
                        "thread_id": checkpoint.meta.thread_id,
                        "version": checkpoint.meta.version,
                        "saved_at": checkpoint.meta.saved_at,
                        "messages": checkpoint.state.messages(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                None => {
                    warn!(thread_id, "No checkpoint stored for thread");
                    return Err(format!("thread '{thread_id}' not found").into());
                }
            }
        }
        RunMode::Rest => {
            info!(addr = %config.server.bind, "Starting REST server");
            server::serve(agent, &config.server).await?;
        }
    }
    info!("threadloop finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    });
}

fn load_prompt(cli: &Cli) -> Result<String, Box<dyn Error + Send + Sync>> {
    if !cli.prompt.is_empty() {
        info!("Using prompt provided through CLI arguments");
        return Ok(cli.prompt.join(" ").trim().to_string());
    }

    if !io::stdin().is_terminal() {
        info!("Reading prompt from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        let prompt = buffer.trim().to_string();
        if !prompt.is_empty() {
            return Ok(prompt);
        }
    }

    warn!("Prompt not provided via arguments or stdin");
    Err("prompt required via arguments or stdin".into())
}
