pub mod app;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod provider;

/// Default config file path - can be overridden via CLI argument
pub const CONFIG_PATH: &str = "config/agent.toml";

pub use app::{AgentSettings, AppConfig, CheckpointConfig, HttpServerConfig, SearchConfig};
pub use error::ConfigError;
pub use loader::ensure_env_loaded;
pub use provider::{ModelInfo, ModelProviderConfig};
