//! # threadloop-core
//!
//! A tool-calling agent loop with resumable conversation threads.
//!
//! Each [`Agent::invoke`](agent::Agent::invoke) call appends the user's
//! message to a thread, alternates reasoning and tool steps until the model
//! stops requesting tools, and checkpoints the thread after every step.
//!
//! - [`agent`]: the loop state machine and its steps
//! - [`tooling`]: tool trait, schema-validating registry, HR lookup tool
//! - [`model`]: provider clients (Gemini, OpenAI-compatible)
//! - [`config`]: TOML configuration
//! - [`server`]: REST service

pub mod agent;
pub mod config;
pub mod constants;
pub mod model;
pub mod server;
pub mod tooling;

pub use agent::{Agent, AgentError, AgentOptions, AgentOutcome};
pub use config::{AppConfig, CheckpointConfig, SearchConfig};
pub use model::{DynamicModelProvider, ModelProvider};
pub use threadloop_session as session;

use std::sync::Arc;
use threadloop_session::{CheckpointStore, FileStore, MemoryStore, SqliteStore, StoreError};
use tooling::{EmployeeLookupTool, HttpDocumentSearch, RegistryError, ToolRegistry};
use tracing::info;

/// Opens the checkpoint store selected in the configuration.
pub async fn open_store(config: &CheckpointConfig) -> Result<Arc<dyn CheckpointStore>, StoreError> {
    let store: Arc<dyn CheckpointStore> = match config {
        CheckpointConfig::Memory => Arc::new(MemoryStore::new()),
        CheckpointConfig::File { dir } => Arc::new(FileStore::open(dir.clone()).await?),
        CheckpointConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
    };
    info!(
        backend = config.backend_name(),
        location = ?config.location(),
        "Checkpoint store ready"
    );
    Ok(store)
}

/// Registers the built-in tools. The HR lookup needs a search endpoint.
pub fn build_registry(search: &SearchConfig) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    match &search.endpoint {
        Some(endpoint) => {
            let backend = HttpDocumentSearch::new(endpoint.clone(), search.index.clone());
            registry.register(Arc::new(EmployeeLookupTool::new(
                Arc::new(backend),
                search.default_results,
            )))?;
        }
        None => info!("No search endpoint configured; employee lookup is disabled"),
    }
    Ok(registry)
}

/// Wires an agent from configuration using the configured HTTP providers.
pub async fn build_agent(
    config: &AppConfig,
) -> Result<Agent<DynamicModelProvider>, Box<dyn std::error::Error + Send + Sync>> {
    let provider = DynamicModelProvider::from_configs(&config.providers);
    let tools = Arc::new(build_registry(&config.search)?);
    let store = open_store(&config.checkpoint).await?;
    Ok(Agent::new(
        provider,
        tools,
        store,
        AgentOptions::from_config(config),
    ))
}
