use super::defaults::*;
use super::error::ConfigError;
use super::provider::{ModelInfo, ModelProviderConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    pub system_message: String,
    pub prompt_template: String,
    pub agent: AgentSettings,
    pub checkpoint: CheckpointConfig,
    pub search: SearchConfig,
    pub server: HttpServerConfig,
    pub providers: Vec<ModelProviderConfig>,
}

/// Limits and switches for the agent loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub recursion_limit: usize,
    pub reasoning_timeout: Duration,
    pub tool_timeout: Duration,
    pub parallel_tool_calls: bool,
    pub temperature: Option<f32>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            reasoning_timeout: Duration::from_secs(DEFAULT_REASONING_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            parallel_tool_calls: true,
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointConfig {
    Memory,
    File { dir: PathBuf },
    Sqlite { path: PathBuf },
}

impl CheckpointConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            CheckpointConfig::Memory => "memory",
            CheckpointConfig::File { .. } => "file",
            CheckpointConfig::Sqlite { .. } => "sqlite",
        }
    }

    pub fn location(&self) -> Option<&Path> {
        match self {
            CheckpointConfig::Memory => None,
            CheckpointConfig::File { dir } => Some(dir),
            CheckpointConfig::Sqlite { path } => Some(path),
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig::Sqlite {
            path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
        }
    }
}

/// Where the lookup tool sends similarity queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub endpoint: Option<String>,
    pub index: String,
    pub default_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            index: DEFAULT_SEARCH_INDEX.to_string(),
            default_results: DEFAULT_SEARCH_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    pub bind: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_origins: Vec::new(),
        }
    }
}

pub(super) fn default_providers() -> Vec<ModelProviderConfig> {
    vec![ModelProviderConfig {
        id: DEFAULT_PROVIDER_ID.to_string(),
        provider_type: "gemini".to_string(),
        endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
        api_key: Some(DEFAULT_GEMINI_KEY_VAR.to_string()),
        api_path: None,
        models: vec![ModelInfo {
            name: DEFAULT_MODEL.to_string(),
            display_name: None,
        }],
    }]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: DEFAULT_PROVIDER_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            agent: AgentSettings::default(),
            checkpoint: CheckpointConfig::default(),
            search: SearchConfig::default(),
            server: HttpServerConfig::default(),
            providers: default_providers(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }

    pub fn provider(&self, id: &str) -> Option<&ModelProviderConfig> {
        self.providers.iter().find(|provider| provider.id == id)
    }
}
